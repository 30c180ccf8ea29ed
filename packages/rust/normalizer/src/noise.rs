//! Last-resort cleanup for captions no rule recognizes.
//!
//! Each pass is a function `&str -> String` applied in sequence: escaped
//! markup is dropped, billing and pagination noise is removed, then
//! punctuation left dangling is tightened.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full noise pipeline on flattened caption text.
pub(crate) fn strip(text: &str) -> String {
    let mut result = strip_markup(text);
    result = strip_billing(&result);
    result = tighten_commas(&result);
    result.trim().to_string()
}

/// Drop tag-like runs and stray angle brackets.
///
/// Text nodes arrive entity-decoded, so a cell holding `&lt;b&gt;` yields a
/// literal `<b>` that must not survive into a title.
pub(crate) fn strip_markup(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

    let untagged = TAG_RE.replace_all(text, " ");
    untagged
        .split(['<', '>'])
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove page counts, prices and the black-and-white marker.
fn strip_billing(text: &str) -> String {
    static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\d+\s*páginas|\d+\s*€|en\s+B/N|\d+,\d+\s*€").expect("valid regex")
    });

    NOISE_RE.replace_all(text, "").to_string()
}

/// `"Title , extra"` → `"Title, extra"`.
fn tighten_commas(text: &str) -> String {
    static SPACE_COMMA_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+,").expect("valid regex"));

    SPACE_COMMA_RE.replace_all(text, ",").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_billing_removes_pages_and_prices() {
        assert_eq!(strip_billing("Akira 362 páginas 12,95 €"), "Akira  ");
        assert_eq!(strip_billing("Akira en B/N 9 €"), "Akira  ");
    }

    #[test]
    fn strip_billing_keeps_plain_text() {
        assert_eq!(strip_billing("Monster Kanzenban"), "Monster Kanzenban");
    }

    #[test]
    fn tighten_commas_joins_dangling_comma() {
        assert_eq!(tighten_commas("Akira , edición"), "Akira, edición");
    }

    #[test]
    fn strip_markup_removes_decoded_tags() {
        assert_eq!(strip_markup("Title <b>nº1</b>"), "Title nº1");
        assert_eq!(strip_markup("Vol. 1 > Vol. 2"), "Vol. 1 Vol. 2");
        assert_eq!(strip_markup("Plain title"), "Plain title");
    }

    #[test]
    fn full_pipeline() {
        assert_eq!(strip("Akira , 362 páginas en B/N 8,00 €"), "Akira,");
        assert_eq!(strip(""), "");
        assert_eq!(strip("<i>Akira</i> 362 páginas"), "Akira");
    }
}
