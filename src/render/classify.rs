//! Decide whether resolved text is HTML or plain text.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::content::ContentKind;
use crate::model::node::MimeType;

/// Markers that make a text HTML on their own, matched case-insensitively.
const DOCUMENT_MARKERS: &[&str] = &["<!doctype", "<html", "<body", "<head"];

static TAG_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?[a-z][^>]*>").expect("static regex"));

/// Classify `text`, trusting structure first and the declared type second.
///
/// Document markers or a matched `<div>`/`<table>` pair always mean HTML.
/// A looser tag-like match only counts when the part was declared
/// `text/html`, so a plain-text mail quoting `<b>` stays plain text.
pub fn classify(text: &str, declared: &MimeType) -> ContentKind {
    let lower = text.to_ascii_lowercase();

    let structural = DOCUMENT_MARKERS.iter().any(|m| lower.contains(m))
        || has_element_pair(&lower, "div")
        || has_element_pair(&lower, "table");

    if structural || (declared == &MimeType::TextHtml && TAG_LIKE.is_match(text)) {
        ContentKind::Html
    } else {
        ContentKind::PlainText
    }
}

/// True if `<tag` (followed by `>` or whitespace) appears before a `</tag>`.
fn has_element_pair(lower: &str, tag: &str) -> bool {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find(&open) {
        let after = search_from + pos + open.len();
        let opens_element = lower[after..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c.is_ascii_whitespace() || c == '/');
        if opens_element {
            return lower[after..].contains(&close);
        }
        search_from = after;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctype_is_html_regardless_of_declared_type() {
        let text = "<!DOCTYPE html><p>hi";
        assert_eq!(classify(text, &MimeType::TextPlain), ContentKind::Html);
        assert_eq!(classify(text, &MimeType::TextHtml), ContentKind::Html);
    }

    #[test]
    fn test_document_markers() {
        for text in ["<HTML><p>x</p></HTML>", "<body>x</body>", "<head></head>"] {
            assert_eq!(classify(text, &MimeType::TextPlain), ContentKind::Html, "{text}");
        }
    }

    #[test]
    fn test_matched_div_and_table() {
        assert_eq!(
            classify("<div class=\"x\">hello</div>", &MimeType::TextPlain),
            ContentKind::Html
        );
        assert_eq!(
            classify("<TABLE><tr><td>1</td></tr></TABLE>", &MimeType::TextPlain),
            ContentKind::Html
        );
    }

    #[test]
    fn test_unmatched_div_is_not_structural() {
        assert_eq!(classify("open <div> only", &MimeType::TextPlain), ContentKind::PlainText);
        // `<divider>` is not a div element.
        assert_eq!(
            classify("<divider> then </div>", &MimeType::TextPlain),
            ContentKind::PlainText
        );
    }

    #[test]
    fn test_generic_tags_need_declared_html() {
        let text = "<b>hi</b>";
        assert_eq!(classify(text, &MimeType::TextHtml), ContentKind::Html);
        assert_eq!(classify(text, &MimeType::TextPlain), ContentKind::PlainText);
    }

    #[test]
    fn test_no_angle_brackets_is_plain() {
        assert_eq!(classify("just words", &MimeType::TextHtml), ContentKind::PlainText);
        assert_eq!(classify("", &MimeType::TextPlain), ContentKind::PlainText);
    }

    #[test]
    fn test_comparison_operators_are_not_tags() {
        assert_eq!(classify("if a < b and c > d", &MimeType::TextHtml), ContentKind::PlainText);
    }
}
