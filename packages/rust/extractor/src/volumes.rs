//! Volume cells: every image in the issue grid whose cell reads like a volume.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use tomoscrape_shared::RawVolumeFragment;

use crate::ParseMiss;
use crate::text::{cell_lines, element_text, enclosing};

static TABLE_IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table img").expect("valid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));

static RELEASE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+ \d{4}").expect("valid regex"));

const PAGES_MARKER: &str = "páginas";
const VOLUME_MARKER: &str = "nº";
const STORE_HOST: &str = "amazon";

/// Collect the raw volume fragments of a page, numbered from 1 in document order.
pub(crate) fn volumes(
    doc: &Html,
    manga_id: u32,
    site_base: &Url,
    misses: &mut Vec<ParseMiss>,
) -> Vec<RawVolumeFragment> {
    let mut out = Vec::new();

    for img in doc.select(&TABLE_IMG) {
        let Some(cell) = enclosing(img, "td") else {
            continue;
        };
        if !is_volume_cell(cell) {
            continue;
        }

        let sequence_number = out.len() as u32 + 1;
        let image_ref = match img.value().attr("src") {
            Some(src) => resolve_image(site_base, src),
            None => {
                misses.push(ParseMiss::ImageSource { sequence_number });
                String::new()
            }
        };
        let date_text = release_date(cell);
        if date_text.is_empty() {
            misses.push(ParseMiss::ReleaseDate { sequence_number });
        }

        out.push(RawVolumeFragment {
            manga_id,
            sequence_number,
            title_fragment_html: cell.html(),
            date_text,
            image_ref,
            purchase_link: purchase_link(cell),
        });
    }

    debug!(manga_id, count = out.len(), "volume cells extracted");
    out
}

fn is_volume_cell(cell: ElementRef<'_>) -> bool {
    let text = cell.text().collect::<String>();
    text.contains(PAGES_MARKER) || text.to_lowercase().contains(VOLUME_MARKER)
}

/// Release date: a dated link, else a dated line, else the last line.
fn release_date(cell: ElementRef<'_>) -> String {
    if let Some(linked) = cell
        .select(&LINK)
        .map(element_text)
        .find(|text| RELEASE_DATE.is_match(text))
    {
        return linked;
    }

    let lines = cell_lines(cell);
    if lines.len() < 2 {
        return String::new();
    }
    lines
        .iter()
        .find(|line| RELEASE_DATE.is_match(line))
        .or_else(|| lines.last())
        .cloned()
        .unwrap_or_default()
}

/// Resolve an image `src` against the site base. Absolute URLs pass through.
fn resolve_image(site_base: &Url, src: &str) -> String {
    let src = src.trim();
    match site_base.join(src) {
        Ok(url) => url.to_string(),
        Err(_) => src.to_string(),
    }
}

fn purchase_link(cell: ElementRef<'_>) -> String {
    cell.select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(STORE_HOST))
        .unwrap_or_default()
        .to_string()
}
