//! Manga page extraction.
//!
//! Turns a parsed manga page from the catalog site into its metadata and the
//! raw volume fragments of its issue grid. Extraction is pure and never
//! fails: missing elements leave fields empty and are reported as
//! [`ParseMiss`]es.

mod meta;
mod text;
mod volumes;

use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use tomoscrape_shared::{MangaMeta, RawVolumeFragment};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// An element the page was expected to have but did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMiss {
    Title,
    Synopsis,
    Author,
    /// No cell on the page looked like a volume.
    NoVolumes,
    /// Volume image without a `src`.
    ImageSource { sequence_number: u32 },
    /// Volume cell without a recognizable release date.
    ReleaseDate { sequence_number: u32 },
}

impl std::fmt::Display for ParseMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Synopsis => write!(f, "synopsis"),
            Self::Author => write!(f, "author"),
            Self::NoVolumes => write!(f, "volumes"),
            Self::ImageSource { sequence_number } => {
                write!(f, "image source of volume {sequence_number}")
            }
            Self::ReleaseDate { sequence_number } => {
                write!(f, "release date of volume {sequence_number}")
            }
        }
    }
}

/// Everything extracted from one manga page.
#[derive(Debug, Clone, Default)]
pub struct ExtractedManga {
    pub meta: MangaMeta,
    pub volumes: Vec<RawVolumeFragment>,
    pub misses: Vec<ParseMiss>,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract metadata and volume fragments from a parsed manga page.
///
/// Relative image sources are resolved against `site_base`.
#[instrument(skip(doc, site_base))]
pub fn extract_volumes(doc: &Html, manga_id: u32, site_base: &Url) -> ExtractedManga {
    let mut misses = Vec::new();

    let meta = MangaMeta {
        title: meta::title(doc),
        synopsis: meta::synopsis(doc),
        author: meta::author(doc),
    };
    if meta.title.is_empty() {
        misses.push(ParseMiss::Title);
    }
    if meta.synopsis.is_empty() {
        misses.push(ParseMiss::Synopsis);
    }
    if meta.author.is_empty() {
        misses.push(ParseMiss::Author);
    }

    let volumes = volumes::volumes(doc, manga_id, site_base, &mut misses);
    if volumes.is_empty() {
        misses.push(ParseMiss::NoVolumes);
    }

    for miss in &misses {
        debug!(manga_id, %miss, "element not found on page");
    }

    ExtractedManga {
        meta,
        volumes,
        misses,
    }
}

/// Parse `html` and extract it. See [`extract_volumes`].
pub fn extract_from_html(html: &str, manga_id: u32, site_base: &Url) -> ExtractedManga {
    let doc = Html::parse_document(html);
    extract_volumes(&doc, manga_id, site_base)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> String {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html")
            .join(name);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read fixture {}: {e}", path.display()))
    }

    fn base() -> Url {
        Url::parse("https://www.listadomanga.es/").unwrap()
    }

    #[test]
    fn full_page() {
        let page = extract_from_html(&fixture("berserk.html"), 12, &base());

        assert_eq!(page.meta.title, "Berserk");
        assert_eq!(page.meta.author, "Kentaro Miura");
        assert!(page.meta.synopsis.starts_with("Guts"));
        assert!(page.meta.synopsis.contains("venganza"));
        assert!(!page.meta.synopsis.contains("Sinopsis"));
        assert!(page.misses.is_empty(), "{:?}", page.misses);

        assert_eq!(page.volumes.len(), 3);
        let first = &page.volumes[0];
        assert_eq!(first.manga_id, 12);
        assert_eq!(first.sequence_number, 1);
        assert_eq!(first.date_text, "Marzo 2003");
        assert_eq!(
            first.image_ref,
            "https://www.listadomanga.es/tomos/berserk/1.jpg"
        );
        assert_eq!(first.purchase_link, "https://www.amazon.es/dp/8496427005");
        assert!(first.title_fragment_html.starts_with("<td"));
        assert!(first.title_fragment_html.contains("232 páginas"));

        assert_eq!(page.volumes[1].date_text, "Abril 2003");
        assert_eq!(page.volumes[1].purchase_link, "");
        assert_eq!(page.volumes[2].date_text, "Mayo 2003");
        assert_eq!(page.volumes[2].image_ref, "https://cdn.listadomanga.es/3.jpg");
    }

    #[test]
    fn cells_feed_the_normalizer_layouts() {
        let page = extract_from_html(&fixture("berserk.html"), 1, &base());
        assert!(page.volumes[0].title_fragment_html.contains("height: 8px"));
        assert!(page.volumes[2].title_fragment_html.contains("<br>"));
    }

    #[test]
    fn synopsis_without_heading_uses_table_layout() {
        let page = extract_from_html(&fixture("akira.html"), 3, &base());

        assert_eq!(page.meta.title, "Akira");
        assert_eq!(page.meta.synopsis, "Neo-Tokyo, 2019.");
        assert_eq!(page.meta.author, "");
        assert_eq!(page.misses, vec![ParseMiss::Author]);

        assert_eq!(page.volumes.len(), 1);
        assert_eq!(page.volumes[0].date_text, "Abril 1990");
        assert_eq!(
            page.volumes[0].image_ref,
            "https://www.listadomanga.es/tomos/akira/1.jpg"
        );
    }

    #[test]
    fn empty_page_reports_misses() {
        let page = extract_from_html("<html><body></body></html>", 1, &base());
        assert!(page.volumes.is_empty());
        assert_eq!(page.meta, MangaMeta::default());
        assert_eq!(
            page.misses,
            vec![
                ParseMiss::Title,
                ParseMiss::Synopsis,
                ParseMiss::Author,
                ParseMiss::NoVolumes
            ]
        );
    }
}
