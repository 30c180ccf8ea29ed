//! Plain text with line-break markers, built from an HTML fragment.
//!
//! Rules never look at raw markup. The fragment is parsed once and flattened
//! into text runs separated by two kinds of markers: `<br>` line breaks and
//! the 8px spacer `<div>` that sits between a volume cover and its caption.

use scraper::{Html, Node, node::Element};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Break,
    Spacer,
}

/// Text content of a fragment with its structural markers kept.
#[derive(Debug, Clone, Default)]
pub struct MarkedText {
    tokens: Vec<Token>,
}

impl MarkedText {
    /// Parse an HTML (or plain text) fragment.
    pub fn parse(fragment: &str) -> Self {
        let doc = Html::parse_fragment(fragment);
        let mut text = Self::default();

        for node in doc.tree.root().descendants() {
            match node.value() {
                Node::Text(t) => {
                    let raw_text = node.ancestors().any(|a| {
                        a.value()
                            .as_element()
                            .is_some_and(|e| matches!(e.name(), "script" | "style"))
                    });
                    if !raw_text {
                        text.push_text(t);
                    }
                }
                Node::Element(el) if el.name() == "br" => text.tokens.push(Token::Break),
                Node::Element(el) if is_spacer(el) => text.tokens.push(Token::Spacer),
                _ => {}
            }
        }

        text
    }

    fn push_text(&mut self, s: &str) {
        match self.tokens.last_mut() {
            Some(Token::Text(prev)) => prev.push_str(s),
            _ => self.tokens.push(Token::Text(s.to_string())),
        }
    }

    /// Index of the first spacer marker, if any.
    pub(crate) fn first_spacer(&self) -> Option<usize> {
        self.tokens.iter().position(|t| *t == Token::Spacer)
    }

    /// Lines of text starting at token `start`. Both marker kinds end a line.
    /// Whitespace inside a line is collapsed and trimmed.
    pub(crate) fn lines_from(&self, start: usize) -> Vec<String> {
        let mut lines = vec![String::new()];
        for token in self.tokens.iter().skip(start) {
            match token {
                Token::Text(s) => {
                    if let Some(line) = lines.last_mut() {
                        line.push_str(s);
                        line.push(' ');
                    }
                }
                Token::Break | Token::Spacer => lines.push(String::new()),
            }
        }
        lines.into_iter().map(|l| collapse_whitespace(&l)).collect()
    }

    /// Lines with leading and trailing empty lines removed.
    pub(crate) fn content_lines(&self) -> Vec<String> {
        let lines = self.lines_from(0);
        let first = lines.iter().position(|l| !l.is_empty());
        let last = lines.iter().rposition(|l| !l.is_empty());
        match (first, last) {
            (Some(first), Some(last)) => lines[first..=last].to_vec(),
            _ => Vec::new(),
        }
    }

    /// All non-empty lines joined by a single space.
    pub fn flat(&self) -> String {
        self.lines_from(0)
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The caption spacer: `<div style="height: 8px">`, any spacing or casing.
fn is_spacer(el: &Element) -> bool {
    if el.name() != "div" {
        return false;
    }
    el.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.split(';').any(|decl| decl == "height:8px")
    })
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_line() {
        let text = MarkedText::parse("Title nº1192 páginas");
        assert_eq!(text.content_lines(), vec!["Title nº1192 páginas"]);
        assert!(text.first_spacer().is_none());
    }

    #[test]
    fn br_splits_lines_and_markup_is_dropped() {
        let text = MarkedText::parse(
            r#"<td><img src="a.jpg"/><br/>Berserk <b>nº1</b><br>192 páginas</td>"#,
        );
        assert_eq!(text.content_lines(), vec!["Berserk nº1", "192 páginas"]);
        assert_eq!(text.flat(), "Berserk nº1 192 páginas");
    }

    #[test]
    fn spacer_detected_regardless_of_formatting() {
        for markup in [
            r#"<div style="height: 8px"></div>x"#,
            r#"<div style="HEIGHT:8px;"></div>x"#,
            r#"<div class="sp" style="width: 100%; height : 8px"></div>x"#,
        ] {
            let text = MarkedText::parse(markup);
            assert_eq!(text.first_spacer(), Some(0), "markup: {markup}");
        }
        let text = MarkedText::parse(r#"<div style="height: 18px"></div>x"#);
        assert!(text.first_spacer().is_none());
    }

    #[test]
    fn whitespace_and_entities_collapse() {
        let text = MarkedText::parse("  One\n   Piece&nbsp;n&ordm;3 \t");
        assert_eq!(text.flat(), "One Piece nº3");
    }

    #[test]
    fn script_content_ignored() {
        let text = MarkedText::parse("Title<script>var x = 1;</script> nº2");
        assert_eq!(text.flat(), "Title nº2");
    }

    #[test]
    fn empty_fragment() {
        assert_eq!(MarkedText::parse("").flat(), "");
        assert_eq!(MarkedText::parse("<img src=\"x.jpg\">").flat(), "");
    }
}
