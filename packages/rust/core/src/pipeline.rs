//! End-to-end `scrape` pipeline: catalog → fetch → extract → normalize →
//! assemble → download → persist.
//!
//! Mangas are processed strictly one after another with a fixed pause
//! between fetches. A manga whose page cannot be fetched is skipped; a
//! failed image download is logged and the record is still persisted.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use tomoscrape_extractor::extract_from_html;
use tomoscrape_fetch::Fetcher;
use tomoscrape_shared::{
    CatalogEntry, CleanVolume, MangaRecord, RawVolumeFragment, Result, ScrapeConfig,
};

use crate::assembler::assemble;
use crate::output::{self, Collections, OutputLayout};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Everything a scrape run produced, in memory. Image references are remote URLs.
#[derive(Debug)]
pub struct ScrapeResult {
    pub mangas: Vec<MangaRecord>,
    pub raw_volumes: Vec<RawVolumeFragment>,
    pub clean_volumes: Vec<CleanVolume>,
    pub summary: RunSummary,
}

/// Run report persisted as `run_summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub catalog_entries: usize,
    pub mangas: usize,
    pub volumes: usize,
    pub images_downloaded: usize,
    pub parse_misses: usize,
    pub skipped: Vec<SkippedEntry>,
    pub failed_downloads: Vec<FailedDownload>,
}

/// A catalog entry whose page could not be fetched.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub id: u32,
    pub url: String,
    pub reason: String,
}

/// An image that could not be downloaded.
#[derive(Debug, Clone, Serialize)]
pub struct FailedDownload {
    pub manga_id: u32,
    pub url: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a manga page is fetched.
    fn manga_started(&self, id: u32, total: usize, url: &str);
    /// Called after a manga is processed. `volumes` is `None` when it was skipped.
    fn manga_done(&self, id: u32, volumes: Option<usize>);
    /// Called when the pipeline completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn manga_started(&self, _id: u32, _total: usize, _url: &str) {}
    fn manga_done(&self, _id: u32, _volumes: Option<usize>) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One manga after extraction, normalization and assembly.
struct ProcessedManga {
    record: MangaRecord,
    raw: Vec<RawVolumeFragment>,
    clean: Vec<CleanVolume>,
    misses: usize,
}

/// Run the full scrape over `entries` and write every output file.
///
/// Manga ids are the 1-based catalog positions, so a skipped entry leaves a
/// gap. Only failing to write the outputs ends the batch early.
#[instrument(skip_all, fields(entries = entries.len(), out = %config.output_dir.display()))]
pub async fn scrape_catalog(
    config: &ScrapeConfig,
    entries: &[CatalogEntry],
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    let start = Instant::now();
    let started_at = Utc::now();
    let fetcher = Fetcher::new(config)?;
    let layout = OutputLayout::new(&config.output_dir);

    info!(count = entries.len(), "starting scrape");
    progress.phase("Scraping catalog");

    let mut mangas = Vec::new();
    let mut raw_volumes = Vec::new();
    let mut clean_volumes = Vec::new();
    let mut skipped = Vec::new();
    let mut failed_downloads = Vec::new();
    let mut images_downloaded = 0;
    let mut parse_misses = 0;

    for (index, entry) in entries.iter().enumerate() {
        let id = index as u32 + 1;
        if index > 0 && config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.delay_ms)).await;
        }
        progress.manga_started(id, entries.len(), &entry.url);

        let html = match fetcher.fetch_document(&entry.url).await {
            Ok(html) => html,
            Err(e) if e.is_recoverable() => {
                warn!(id, url = %entry.url, error = %e, "fetch failed, skipping manga");
                skipped.push(SkippedEntry {
                    id,
                    url: entry.url.clone(),
                    reason: e.to_string(),
                });
                progress.manga_done(id, None);
                continue;
            }
            Err(e) => return Err(e),
        };

        let processed = process_page(&html, id, entry, &config.site_base);
        parse_misses += processed.misses;

        if config.download_images {
            for (url, path) in image_jobs(&processed, &layout) {
                match fetcher.download_image(&url, &path).await {
                    Ok(_) => images_downloaded += 1,
                    Err(e) if e.is_recoverable() => {
                        warn!(id, %url, error = %e, "image download failed");
                        failed_downloads.push(FailedDownload {
                            manga_id: id,
                            url,
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        progress.manga_done(id, Some(processed.record.volume_count));
        mangas.push(processed.record);
        raw_volumes.extend(processed.raw);
        clean_volumes.extend(processed.clean);
    }

    progress.phase("Writing output");
    output::write_collections(
        &layout,
        &Collections {
            mangas: &mangas,
            raw_volumes: &raw_volumes,
            clean_volumes: &clean_volumes,
        },
        config.local_image_refs,
    )?;

    let summary = RunSummary {
        started_at,
        finished_at: Utc::now(),
        catalog_entries: entries.len(),
        mangas: mangas.len(),
        volumes: raw_volumes.len(),
        images_downloaded,
        parse_misses,
        skipped,
        failed_downloads,
    };
    output::write_json(&layout.summary(), &summary)?;

    progress.done(&summary);

    info!(
        mangas = summary.mangas,
        volumes = summary.volumes,
        skipped = summary.skipped.len(),
        failed_downloads = summary.failed_downloads.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scrape complete"
    );

    Ok(ScrapeResult {
        mangas,
        raw_volumes,
        clean_volumes,
        summary,
    })
}

/// Extract, normalize and assemble one fetched page.
fn process_page(html: &str, id: u32, entry: &CatalogEntry, site_base: &Url) -> ProcessedManga {
    let extracted = extract_from_html(html, id, site_base);
    let clean = tomoscrape_normalizer::normalize_volumes(&extracted.volumes);
    let record = assemble(
        &extracted.meta,
        &clean,
        id,
        entry.kind.as_deref().unwrap_or_default(),
    );

    ProcessedManga {
        record,
        misses: extracted.misses.len(),
        raw: extracted.volumes,
        clean,
    }
}

/// Cover first, then every volume image, as `(remote url, local path)`.
fn image_jobs(processed: &ProcessedManga, layout: &OutputLayout) -> Vec<(String, PathBuf)> {
    let id = processed.record.id;
    let cover = (!processed.record.cover_image_ref.is_empty())
        .then(|| (processed.record.cover_image_ref.clone(), layout.cover_image(id)));

    cover
        .into_iter()
        .chain(
            processed
                .raw
                .iter()
                .filter(|v| !v.image_ref.is_empty())
                .map(|v| (v.image_ref.clone(), layout.volume_image(id, v.sequence_number))),
        )
        .collect()
}
