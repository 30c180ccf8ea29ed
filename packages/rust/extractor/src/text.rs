//! Text helpers over parsed HTML elements.

use scraper::{ElementRef, Node};

/// Trimmed text content of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text content of `el` with the subtrees of `excluded` tags left out.
/// `<br>` becomes a newline.
pub(crate) fn text_without(el: ElementRef<'_>, excluded: &[&str]) -> String {
    let mut out = String::new();
    collect_text(el, excluded, &mut out);
    out.trim().to_string()
}

fn collect_text(el: ElementRef<'_>, excluded: &[&str], out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if e.name() == "br" => out.push('\n'),
            Node::Element(e) if excluded.contains(&e.name()) => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, excluded, out);
                }
            }
            _ => {}
        }
    }
}

/// Non-empty text lines of a cell, split on `<br>` and literal newlines.
pub(crate) fn cell_lines(el: ElementRef<'_>) -> Vec<String> {
    let mut lines = vec![String::new()];
    for node in el.descendants() {
        match node.value() {
            Node::Text(t) => {
                let mut parts = t.split('\n');
                if let (Some(first), Some(line)) = (parts.next(), lines.last_mut()) {
                    line.push_str(first);
                }
                lines.extend(parts.map(str::to_string));
            }
            Node::Element(e) if e.name() == "br" => lines.push(String::new()),
            _ => {}
        }
    }

    lines
        .iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect()
}

/// Nearest ancestor element with the given tag name.
pub(crate) fn enclosing<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}

/// Next sibling element with the given tag name.
pub(crate) fn next_sibling_named<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|s| s.value().name() == tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, sel: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(sel).unwrap()).next().unwrap()
    }

    #[test]
    fn text_without_skips_excluded_subtrees() {
        let doc = Html::parse_document(
            "<table><tr><td><h2>Sinopsis de X</h2><hr/>Uno.<br/>Dos.</td></tr></table>",
        );
        let td = first(&doc, "td");
        assert_eq!(text_without(td, &["h2", "hr"]), "Uno.\nDos.");
    }

    #[test]
    fn cell_lines_split_on_br_and_newlines() {
        let doc = Html::parse_document(
            "<table><tr><td><img src=a.jpg><br>Akira  nº1\n<br>362 páginas\nAbril 1990</td></tr></table>",
        );
        let td = first(&doc, "td");
        assert_eq!(
            cell_lines(td),
            vec!["Akira nº1", "362 páginas", "Abril 1990"]
        );
    }

    #[test]
    fn enclosing_finds_nearest_ancestor() {
        let doc = Html::parse_document(
            "<table id=outer><tr><td id=o><table id=inner><tr><td id=i><img></td></tr></table></td></tr></table>",
        );
        let img = first(&doc, "img");
        assert_eq!(enclosing(img, "td").unwrap().value().id(), Some("i"));
        assert_eq!(enclosing(img, "table").unwrap().value().id(), Some("inner"));
    }
}
