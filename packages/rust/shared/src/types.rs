//! Core domain types for scraped manga records.
//!
//! Field names follow Rust conventions; the serialized keys match the JSON
//! collections read by the catalog backend (`titulo`, `fecha`, `id_manga`, ...).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CatalogEntry
// ---------------------------------------------------------------------------

/// One row of the pre-filtered input catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Manga page URL on the catalog site.
    pub url: String,
    /// Publication type (`"manga"`, `"manhwa"`, ...), if known.
    #[serde(default, rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Volumes
// ---------------------------------------------------------------------------

/// A volume cell exactly as found on the page.
///
/// `title_fragment_html` still holds the full cell markup; the title
/// normalizer turns it into a [`CleanVolume`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVolumeFragment {
    /// Owning manga.
    #[serde(rename = "id_manga")]
    pub manga_id: u32,
    /// 1-based position in document order.
    #[serde(rename = "numero")]
    pub sequence_number: u32,
    /// Untrusted cell markup (title + page count + price + date).
    #[serde(rename = "titulo")]
    pub title_fragment_html: String,
    /// Release date text, e.g. `"Marzo 2020"`.
    #[serde(rename = "fecha")]
    pub date_text: String,
    /// Absolute cover image URL (or local asset path once persisted).
    #[serde(rename = "imagen")]
    pub image_ref: String,
    /// Store link, empty when the cell has none.
    #[serde(rename = "amazon_link")]
    pub purchase_link: String,
}

/// A volume whose title has been normalized to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanVolume {
    #[serde(rename = "id_manga")]
    pub manga_id: u32,
    #[serde(rename = "numero")]
    pub sequence_number: u32,
    /// Plain-text title without markup or trailing metadata.
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fecha")]
    pub date_text: String,
    #[serde(rename = "imagen")]
    pub image_ref: String,
    #[serde(rename = "amazon_link")]
    pub purchase_link: String,
}

impl CleanVolume {
    /// Build a clean volume from its raw fragment and the normalized title.
    pub fn from_raw(raw: &RawVolumeFragment, title: String) -> Self {
        Self {
            manga_id: raw.manga_id,
            sequence_number: raw.sequence_number,
            title,
            date_text: raw.date_text.clone(),
            image_ref: raw.image_ref.clone(),
            purchase_link: raw.purchase_link.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Manga
// ---------------------------------------------------------------------------

/// Page-level metadata found next to the volume grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MangaMeta {
    pub title: String,
    pub synopsis: String,
    pub author: String,
}

/// Manga-level record derived from one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaRecord {
    pub id: u32,
    #[serde(rename = "titulo")]
    pub title: String,
    /// `"MM/YYYY"`, or empty when no date could be derived.
    #[serde(rename = "fecha")]
    pub publish_date: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "sinopsis")]
    pub synopsis: String,
    #[serde(rename = "volumenes")]
    pub volume_count: usize,
    /// First volume's image reference, empty without volumes.
    #[serde(rename = "foto_portada")]
    pub cover_image_ref: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    /// Backdrop image, filled in by the backend.
    #[serde(rename = "foto_fondo", default)]
    pub background_image_ref: String,
    /// Logo image, filled in by the backend.
    #[serde(rename = "foto_logo", default)]
    pub logo_image_ref: String,
    /// Manga-level store link; volumes carry their own.
    #[serde(rename = "amazon_link", default)]
    pub purchase_link: String,
}
