//! Page-level metadata: title, synopsis, author.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::text::{element_text, enclosing, next_sibling_named, text_without};

static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("valid selector"));
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));

static EDITED_ISSUES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Números editados").expect("valid regex"));
static SCRIPT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Guion:").expect("valid regex"));
static ART_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Dibujo:").expect("valid regex"));

const SYNOPSIS_HEADING: &str = "Sinopsis de";
const SYNOPSIS_EXCLUDED: &[&str] = &["h2", "hr"];

/// Text of the first `h2`.
pub(crate) fn title(doc: &Html) -> String {
    doc.select(&H2).next().map(element_text).unwrap_or_default()
}

/// Synopsis cell text, located by its heading or, failing that, by its
/// position relative to the issue list.
pub(crate) fn synopsis(doc: &Html) -> String {
    let by_heading = doc
        .select(&H2)
        .find(|h| h.text().collect::<String>().contains(SYNOPSIS_HEADING))
        .and_then(|h| enclosing(h, "td"))
        .map(|td| text_without(td, SYNOPSIS_EXCLUDED))
        .unwrap_or_default();

    if !by_heading.is_empty() {
        return by_heading;
    }

    synopsis_after_issue_list(doc)
        .map(|td| text_without(td, SYNOPSIS_EXCLUDED))
        .unwrap_or_default()
}

/// Pages without a synopsis heading keep it in the second table after the
/// block that holds the "Números editados" label.
fn synopsis_after_issue_list(doc: &Html) -> Option<ElementRef<'_>> {
    let label = doc
        .tree
        .root()
        .descendants()
        .find(|n| matches!(n.value(), Node::Text(t) if EDITED_ISSUES.is_match(t)))?;

    let block = label
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "table")
        .nth(2)?;

    let volumes_table = next_sibling_named(block, "table")?;
    let synopsis_table = next_sibling_named(volumes_table, "table")?;
    synopsis_table.select(&TD).next()
}

/// Credited author: the scriptwriter, else the artist.
pub(crate) fn author(doc: &Html) -> String {
    [&*SCRIPT_LABEL, &*ART_LABEL]
        .into_iter()
        .filter_map(|label| link_after_label(doc, label))
        .find(|name| !name.is_empty())
        .unwrap_or_default()
}

/// Text of the first `a` following the first text node matching `label`.
fn link_after_label(doc: &Html, label: &Regex) -> Option<String> {
    let mut after_label = false;
    for node in doc.tree.root().descendants() {
        if !after_label {
            if let Node::Text(t) = node.value() {
                after_label = label.is_match(t);
            }
            continue;
        }
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "a" {
                return Some(element_text(el));
            }
        }
    }
    None
}
