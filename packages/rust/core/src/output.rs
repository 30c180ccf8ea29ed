//! Output directory layout and JSON persistence.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use tomoscrape_shared::{CleanVolume, MangaRecord, RawVolumeFragment, Result, TomoError};

pub const MANGAS_FILE: &str = "mangas_detailed.json";
pub const RAW_VOLUMES_FILE: &str = "volumes.json";
pub const CLEAN_VOLUMES_FILE: &str = "volumes_fixed.json";
pub const SUMMARY_FILE: &str = "run_summary.json";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Paths of everything a scrape run writes under its output directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mangas(&self) -> PathBuf {
        self.root.join(MANGAS_FILE)
    }

    pub fn raw_volumes(&self) -> PathBuf {
        self.root.join(RAW_VOLUMES_FILE)
    }

    pub fn clean_volumes(&self) -> PathBuf {
        self.root.join(CLEAN_VOLUMES_FILE)
    }

    pub fn summary(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    /// `tomos/{manga_id}/{n}.jpg` on disk.
    pub fn volume_image(&self, manga_id: u32, sequence_number: u32) -> PathBuf {
        self.root.join(volume_image_ref(manga_id, sequence_number))
    }

    /// `images/portadas/{manga_id}.jpg` on disk.
    pub fn cover_image(&self, manga_id: u32) -> PathBuf {
        self.root
            .join("images")
            .join("portadas")
            .join(format!("{manga_id}.jpg"))
    }
}

/// Persisted reference to a downloaded volume image.
pub fn volume_image_ref(manga_id: u32, sequence_number: u32) -> String {
    format!("tomos/{manga_id}/{sequence_number}.jpg")
}

/// Persisted reference to a downloaded cover, as served by the backend.
pub fn cover_image_ref(manga_id: u32) -> String {
    format!("/images/portadas/{manga_id}.jpg")
}

// ---------------------------------------------------------------------------
// Local image references
// ---------------------------------------------------------------------------

/// Swap remote image URLs for local asset paths. Empty references stay empty.
pub fn localize_record(record: &MangaRecord) -> MangaRecord {
    let mut local = record.clone();
    if !local.cover_image_ref.is_empty() {
        local.cover_image_ref = cover_image_ref(record.id);
    }
    local
}

pub fn localize_raw_volume(volume: &RawVolumeFragment) -> RawVolumeFragment {
    let mut local = volume.clone();
    if !local.image_ref.is_empty() {
        local.image_ref = volume_image_ref(volume.manga_id, volume.sequence_number);
    }
    local
}

pub fn localize_clean_volume(volume: &CleanVolume) -> CleanVolume {
    let mut local = volume.clone();
    if !local.image_ref.is_empty() {
        local.image_ref = volume_image_ref(volume.manga_id, volume.sequence_number);
    }
    local
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// The three collections of a run, written together.
pub struct Collections<'a> {
    pub mangas: &'a [MangaRecord],
    pub raw_volumes: &'a [RawVolumeFragment],
    pub clean_volumes: &'a [CleanVolume],
}

/// Write `mangas_detailed.json`, `volumes.json` and `volumes_fixed.json`.
#[instrument(skip(layout, collections), fields(root = %layout.root().display()))]
pub fn write_collections(
    layout: &OutputLayout,
    collections: &Collections<'_>,
    local_image_refs: bool,
) -> Result<()> {
    std::fs::create_dir_all(layout.root()).map_err(|e| TomoError::io(layout.root(), e))?;

    if local_image_refs {
        let mangas: Vec<_> = collections.mangas.iter().map(localize_record).collect();
        let raw: Vec<_> = collections.raw_volumes.iter().map(localize_raw_volume).collect();
        let clean: Vec<_> = collections
            .clean_volumes
            .iter()
            .map(localize_clean_volume)
            .collect();
        write_json(&layout.mangas(), &mangas)?;
        write_json(&layout.raw_volumes(), &raw)?;
        write_json(&layout.clean_volumes(), &clean)?;
    } else {
        write_json(&layout.mangas(), &collections.mangas)?;
        write_json(&layout.raw_volumes(), &collections.raw_volumes)?;
        write_json(&layout.clean_volumes(), &collections.clean_volumes)?;
    }

    info!(
        mangas = collections.mangas.len(),
        volumes = collections.raw_volumes.len(),
        "collections written"
    );
    Ok(())
}

/// Re-normalize the titles of a persisted raw volume list.
/// Returns the number of volumes written.
#[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
pub fn clean_volume_titles(input: &Path, output: &Path) -> Result<usize> {
    let raw: Vec<RawVolumeFragment> = read_json(input)?;
    let clean = tomoscrape_normalizer::normalize_volumes(&raw);
    write_json(output, &clean)?;
    info!(count = clean.len(), "volume titles cleaned");
    Ok(clean.len())
}

/// Serialize `data` as pretty JSON to `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| TomoError::Serialization(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| TomoError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| TomoError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        TomoError::Serialization(format!("failed to parse {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tomo-output-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn raw_volume(n: u32, fragment: &str) -> RawVolumeFragment {
        RawVolumeFragment {
            manga_id: 2,
            sequence_number: n,
            title_fragment_html: fragment.into(),
            date_text: "Enero 2001".into(),
            image_ref: format!("https://www.listadomanga.es/tomos/x/{n}.jpg"),
            purchase_link: String::new(),
        }
    }

    fn record() -> MangaRecord {
        MangaRecord {
            id: 2,
            title: "Vagabond".into(),
            publish_date: "01/2001".into(),
            author: "Takehiko Inoue".into(),
            synopsis: String::new(),
            volume_count: 1,
            cover_image_ref: "https://www.listadomanga.es/tomos/x/1.jpg".into(),
            kind: "manga".into(),
            background_image_ref: String::new(),
            logo_image_ref: String::new(),
            purchase_link: String::new(),
        }
    }

    #[test]
    fn layout_paths() {
        let layout = OutputLayout::new("/out");
        assert_eq!(layout.volume_image(3, 12), PathBuf::from("/out/tomos/3/12.jpg"));
        assert_eq!(layout.cover_image(3), PathBuf::from("/out/images/portadas/3.jpg"));
        assert_eq!(layout.clean_volumes(), PathBuf::from("/out/volumes_fixed.json"));
    }

    #[test]
    fn localize_rewrites_only_present_refs() {
        let local = localize_record(&record());
        assert_eq!(local.cover_image_ref, "/images/portadas/2.jpg");

        let mut bare = record();
        bare.cover_image_ref.clear();
        assert_eq!(localize_record(&bare).cover_image_ref, "");

        assert_eq!(localize_raw_volume(&raw_volume(4, "")).image_ref, "tomos/2/4.jpg");
    }

    #[test]
    fn write_collections_with_local_refs() {
        let dir = temp_dir();
        let layout = OutputLayout::new(&dir);
        let raw = vec![raw_volume(1, "Vagabond nº1192 páginas")];
        let clean = tomoscrape_normalizer::normalize_volumes(&raw);
        let mangas = vec![record()];

        write_collections(
            &layout,
            &Collections {
                mangas: &mangas,
                raw_volumes: &raw,
                clean_volumes: &clean,
            },
            true,
        )
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(layout.clean_volumes()).unwrap())
                .unwrap();
        assert_eq!(written[0]["titulo"], "Vagabond nº1");
        assert_eq!(written[0]["imagen"], "tomos/2/1.jpg");

        let mangas: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(layout.mangas()).unwrap()).unwrap();
        assert_eq!(mangas[0]["foto_portada"], "/images/portadas/2.jpg");
        assert_eq!(mangas[0]["foto_fondo"], "");
        assert_eq!(mangas[0]["foto_logo"], "");
        assert_eq!(mangas[0]["amazon_link"], "");

        // In-memory records keep the remote URL.
        assert!(raw[0].image_ref.starts_with("https://"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_collections_with_remote_refs() {
        let dir = temp_dir();
        let layout = OutputLayout::new(&dir);
        let raw = vec![raw_volume(1, "X nº1")];

        write_collections(
            &layout,
            &Collections {
                mangas: &[],
                raw_volumes: &raw,
                clean_volumes: &[],
            },
            false,
        )
        .unwrap();

        let written: Vec<RawVolumeFragment> = read_json(&layout.raw_volumes()).unwrap();
        assert_eq!(written, raw);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn clean_volume_titles_rewrites_file() {
        let dir = temp_dir();
        let input = dir.join("volumes.json");
        let output = dir.join("volumes_fixed.json");
        write_json(
            &input,
            &vec![
                raw_volume(1, "Title nº1192 páginas"),
                raw_volume(2, "<td><img><br>Title nº2<br>200 páginas</td>"),
            ],
        )
        .unwrap();

        assert_eq!(clean_volume_titles(&input, &output).unwrap(), 2);

        let clean: Vec<CleanVolume> = read_json(&output).unwrap();
        assert_eq!(clean[0].title, "Title nº1");
        assert_eq!(clean[1].title, "Title nº2");
        assert_eq!(clean[1].sequence_number, 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn clean_volume_titles_missing_input() {
        let dir = temp_dir();
        let err = clean_volume_titles(&dir.join("nope.json"), &dir.join("out.json")).unwrap_err();
        assert!(matches!(err, TomoError::Io { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
