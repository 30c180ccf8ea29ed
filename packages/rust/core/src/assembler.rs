//! Manga record assembly from page metadata and normalized volumes.

use std::sync::LazyLock;

use regex::Regex;

use tomoscrape_shared::{CleanVolume, MangaMeta, MangaRecord};

static MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\s+(\d{4})").expect("valid regex"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").expect("valid regex"));

/// Month used when the month word is not recognized.
const DEFAULT_MONTH: &str = "01";

const MONTHS: [(&str, &str); 12] = [
    ("enero", "01"),
    ("febrero", "02"),
    ("marzo", "03"),
    ("abril", "04"),
    ("mayo", "05"),
    ("junio", "06"),
    ("julio", "07"),
    ("agosto", "08"),
    ("septiembre", "09"),
    ("octubre", "10"),
    ("noviembre", "11"),
    ("diciembre", "12"),
];

/// Build the manga-level record. `volumes` must be in sequence order.
pub fn assemble(
    meta: &MangaMeta,
    volumes: &[CleanVolume],
    manga_id: u32,
    kind: &str,
) -> MangaRecord {
    let first = volumes.first();

    MangaRecord {
        id: manga_id,
        title: meta.title.clone(),
        publish_date: first.map(|v| publish_date(&v.date_text)).unwrap_or_default(),
        author: meta.author.clone(),
        synopsis: meta.synopsis.clone(),
        volume_count: volumes.len(),
        cover_image_ref: first.map(|v| v.image_ref.clone()).unwrap_or_default(),
        kind: kind.to_string(),
        background_image_ref: String::new(),
        logo_image_ref: String::new(),
        purchase_link: String::new(),
    }
}

/// `"Marzo 2020"` → `"03/2020"`, `"2020"` → `"01/2020"`, otherwise `""`.
pub fn publish_date(date_text: &str) -> String {
    if let Some(caps) = MONTH_YEAR.captures(date_text) {
        return format!("{}/{}", month_number(&caps[1]), &caps[2]);
    }
    match YEAR.find(date_text) {
        Some(year) => format!("{DEFAULT_MONTH}/{}", year.as_str()),
        None => String::new(),
    }
}

fn month_number(word: &str) -> &'static str {
    let word = word.to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, number)| *number)
        .unwrap_or(DEFAULT_MONTH)
}
