//! Volume title normalization.
//!
//! Volume cells on the catalog site mix the title with its volume number,
//! page count, price and release date in several layouts. The normalizer
//! parses a cell fragment into [`MarkedText`] and runs an ordered list of
//! [`TitleRule`]s over it; the first rule that commits wins. When no rule
//! applies, billing and pagination noise is stripped from the flattened text.

mod marked;
mod noise;
pub mod rules;

use std::sync::LazyLock;

use tracing::trace;

use tomoscrape_shared::{CleanVolume, RawVolumeFragment};

pub use marked::MarkedText;
pub use rules::{HashOrVolRule, LineBreakRule, SpacerDelimitedRule, TitleRule, VolumePatternRule};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which rule produced a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Caption between the spacer div and the page count.
    SpacerDelimited,
    /// Caption cut at a line break.
    LineBreak,
    /// `nº` + volume digits glued to a three-digit page count.
    PackedPageCount { volume_digits: u8 },
    /// `nº` + volume, whitespace, page count.
    SpacedPageCount,
    /// Bare `nº`/`n°` + digits.
    VolumeNumber,
    /// `#N` or `Vol. N`.
    HashOrVol,
    /// Nothing matched; noise stripped.
    Fallback,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpacerDelimited => "spacer-delimited",
            Self::LineBreak => "line-break",
            Self::PackedPageCount { .. } => "packed-page-count",
            Self::SpacedPageCount => "spaced-page-count",
            Self::VolumeNumber => "volume-number",
            Self::HashOrVol => "hash-or-vol",
            Self::Fallback => "fallback",
        }
    }
}

/// A normalized title and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanTitle {
    pub title: String,
    pub rule: RuleKind,
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Holds the title rules in priority order.
pub struct TitleNormalizer {
    rules: Vec<Box<dyn TitleRule>>,
}

impl TitleNormalizer {
    /// Create a normalizer with all built-in rules, most specific first.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(SpacerDelimitedRule),
                Box::new(LineBreakRule),
                Box::new(rules::packed_page_count(1)),
                Box::new(rules::packed_page_count(2)),
                Box::new(rules::packed_page_count(3)),
                Box::new(rules::spaced_page_count()),
                Box::new(rules::volume_number()),
                Box::new(HashOrVolRule),
            ],
        }
    }

    /// Normalize a fragment and report which rule committed.
    pub fn normalize_detailed(&self, fragment: &str) -> CleanTitle {
        let text = MarkedText::parse(fragment);

        for rule in &self.rules {
            if let Some(clean) = rule.try_match(&text) {
                trace!(
                    rule = rule.name(),
                    kind = clean.rule.as_str(),
                    title = %clean.title,
                    "title rule matched"
                );
                return clean;
            }
        }

        let title = noise::strip(&text.flat());
        trace!(
            kind = RuleKind::Fallback.as_str(),
            title = %title,
            "no title rule matched, stripped noise"
        );
        CleanTitle {
            title,
            rule: RuleKind::Fallback,
        }
    }

    /// Normalize a fragment to a plain-text title.
    pub fn normalize(&self, fragment: &str) -> String {
        self.normalize_detailed(fragment).title
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_NORMALIZER: LazyLock<TitleNormalizer> = LazyLock::new(TitleNormalizer::new);

/// Normalize a fragment with the built-in rules.
pub fn normalize(fragment: &str) -> String {
    DEFAULT_NORMALIZER.normalize(fragment)
}

/// Normalize every raw volume, one clean volume per fragment, order kept.
pub fn normalize_volumes(raw: &[RawVolumeFragment]) -> Vec<CleanVolume> {
    raw.iter()
        .map(|volume| CleanVolume::from_raw(volume, normalize(&volume.title_fragment_html)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
