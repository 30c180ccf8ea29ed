//! Title extraction rules, tried in priority order.
//!
//! Each rule looks at the [`MarkedText`] of a cell and either commits to a
//! title or declines. More specific layouts come first; the noise-stripping
//! fallback in [`crate::noise`] runs only when every rule declines.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::marked::MarkedText;
use crate::noise::strip_markup;
use crate::{CleanTitle, RuleKind};

/// Volume-number marker.
const VOLUME_MARKER: &str = "nº";

/// Page-count marker that ends the caption in the spacer layout.
const PAGE_MARKER: &str = "página";

/// A single title extraction strategy.
pub trait TitleRule: Send + Sync {
    /// Try to extract a title. `None` means the rule does not apply.
    fn try_match(&self, text: &MarkedText) -> Option<CleanTitle>;

    /// Human-readable rule name for tracing.
    fn name(&self) -> &str;
}

fn committed(title: String, rule: RuleKind) -> Option<CleanTitle> {
    let title = strip_markup(&title);
    if title.is_empty() {
        None
    } else {
        Some(CleanTitle { title, rule })
    }
}

fn join_non_empty<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    segments
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Rule 1: caption after the spacer div, ended by the page count
// ---------------------------------------------------------------------------

/// `<img><div style="height: 8px"></div>Title<br>192 páginas<br>...`
pub struct SpacerDelimitedRule;

impl TitleRule for SpacerDelimitedRule {
    fn try_match(&self, text: &MarkedText) -> Option<CleanTitle> {
        let spacer = text.first_spacer()?;
        let caption = text.lines_from(spacer + 1).join("\n");
        let end = caption.find(PAGE_MARKER)?;

        // The last segment before "página" is the page count itself.
        let mut segments: Vec<&str> = caption[..end].split('\n').collect();
        segments.pop();

        committed(
            join_non_empty(segments.into_iter()),
            RuleKind::SpacerDelimited,
        )
    }

    fn name(&self) -> &str {
        "spacer-delimited"
    }
}

// ---------------------------------------------------------------------------
// Rule 2: line breaks inside the caption
// ---------------------------------------------------------------------------

/// `Title nº3<br>192 páginas<br>8,00 €`
pub struct LineBreakRule;

impl TitleRule for LineBreakRule {
    fn try_match(&self, text: &MarkedText) -> Option<CleanTitle> {
        let lines = text.content_lines();
        if lines.len() < 2 {
            return None;
        }
        let joined = lines.join("\n");

        let head = match joined.find(VOLUME_MARKER) {
            Some(pos) => match joined[pos..].find('\n') {
                Some(offset) => &joined[..pos + offset],
                None => first_line(&joined),
            },
            None => first_line(&joined),
        };

        committed(join_non_empty(head.split('\n')), RuleKind::LineBreak)
    }

    fn name(&self) -> &str {
        "line-break"
    }
}

fn first_line(s: &str) -> &str {
    s.split('\n').next().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Rule 3: single-line patterns
// ---------------------------------------------------------------------------

/// Join the text before a match with the volume marker and number.
fn compose(before: &str, prefix: &str, volume: &str) -> String {
    let base = before.trim_end_matches(|c: char| c.is_whitespace() || c == ',');
    format!("{base} {prefix}{volume}").trim().to_string()
}

/// A single-line regex whose group 1 is the marker prefix and group 2 the volume number.
pub struct VolumePatternRule {
    name: &'static str,
    kind: RuleKind,
    pattern: &'static LazyLock<Regex>,
}

impl TitleRule for VolumePatternRule {
    fn try_match(&self, text: &MarkedText) -> Option<CleanTitle> {
        let flat = text.flat();
        let caps = self.pattern.captures(&flat)?;
        let start = caps.get(0)?.start();
        committed(compose(&flat[..start], &caps[1], &caps[2]), self.kind)
    }

    fn name(&self) -> &str {
        self.name
    }
}

static PACKED_1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(nº\s*)(\d{1})(\d{3})(\s*páginas)").expect("valid regex"));
static PACKED_2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(nº\s*)(\d{2})(\d{3})(\s*páginas)").expect("valid regex"));
static PACKED_3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(nº\s*)(\d{3})(\d{3})(\s*páginas)").expect("valid regex"));
static SPACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(nº\s*)(\d+)(\s+\d+\s*páginas)").expect("valid regex"));
static VOLUME_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(n[°º]\s*)(\d+)").expect("valid regex"));

/// `nº1192 páginas`: a one-digit volume glued to a three-digit page count.
/// Digit counts outside `1..=3` select the three-digit pattern.
pub fn packed_page_count(volume_digits: u8) -> VolumePatternRule {
    let (name, pattern, volume_digits) = match volume_digits {
        1 => ("packed-page-count-1", &PACKED_1, 1),
        2 => ("packed-page-count-2", &PACKED_2, 2),
        _ => ("packed-page-count-3", &PACKED_3, 3),
    };
    VolumePatternRule {
        name,
        kind: RuleKind::PackedPageCount { volume_digits },
        pattern,
    }
}

/// `nº1 192 páginas`
pub fn spaced_page_count() -> VolumePatternRule {
    VolumePatternRule {
        name: "spaced-page-count",
        kind: RuleKind::SpacedPageCount,
        pattern: &SPACED,
    }
}

/// `nº12` or `n°12` with nothing assumed after it.
pub fn volume_number() -> VolumePatternRule {
    VolumePatternRule {
        name: "volume-number",
        kind: RuleKind::VolumeNumber,
        pattern: &VOLUME_NUMBER,
    }
}

/// `#5` or `Vol. 3`.
pub struct HashOrVolRule;

impl TitleRule for HashOrVolRule {
    fn try_match(&self, text: &MarkedText) -> Option<CleanTitle> {
        static HASH_OR_VOL: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"#\s*(\d+)|[Vv]ol\.\s*(\d+)").expect("valid regex"));

        let flat = text.flat();
        let caps: Captures = HASH_OR_VOL.captures(&flat)?;
        let whole = caps.get(0)?;
        let volume = caps.get(1).or_else(|| caps.get(2))?.as_str();

        // Prefix is the match up to the first occurrence of the number. Breaks
        // if the number's digits also appear earlier inside the match.
        let prefix = whole.as_str().split(volume).next().unwrap_or_default();

        committed(
            compose(&flat[..whole.start()], prefix, volume),
            RuleKind::HashOrVol,
        )
    }

    fn name(&self) -> &str {
        "hash-or-vol"
    }
}
