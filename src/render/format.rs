//! Turn classified text into markup a caller can assign directly.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::content::ContentKind;

/// Class on the container wrapped around plain-text bodies.
pub const PLAIN_TEXT_CLASS: &str = "plain-text-body";

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("static regex"));

/// Punctuation that ends a sentence rather than a URL.
const URL_TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\''];

/// Format `text` as markup according to its kind.
pub fn format(text: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::PlainText => format_plain_text(text),
        ContentKind::Html => format_html(text),
    }
}

/// Escape, linkify and preserve the layout of a plain-text body.
pub fn format_plain_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(text.len() + text.len() / 4 + 96);
    out.push_str("<div class=\"");
    out.push_str(PLAIN_TEXT_CLASS);
    out.push_str("\" style=\"font-family: inherit; overflow-wrap: anywhere;\">");

    let mut last = 0;
    for m in BARE_URL.find_iter(&text) {
        let url = m.as_str().trim_end_matches(URL_TRAILING_PUNCTUATION);
        if url.ends_with("://") {
            continue;
        }
        push_text(&mut out, &text[last..m.start()]);
        push_link(&mut out, url);
        last = m.start() + url.len();
    }
    push_text(&mut out, &text[last..]);

    out.push_str("</div>");
    out
}

/// Wrap an HTML fragment in a minimal document; full documents pass through.
///
/// Scripts and styles are left in place.
pub fn format_html(text: &str) -> String {
    if text.to_ascii_lowercase().contains("<html") {
        return text.to_string();
    }
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{text}</body></html>"
    )
}

/// Escape `&`, `<` and `>`; newlines become `<br>`; space runs keep their width.
fn push_text(out: &mut String, text: &str) {
    let mut spaces = 0usize;
    for ch in text.chars() {
        if ch == ' ' {
            spaces += 1;
            continue;
        }
        flush_spaces(out, spaces);
        spaces = 0;
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    flush_spaces(out, spaces);
}

/// A run of n spaces becomes n-1 `&nbsp;` and one breakable space.
fn flush_spaces(out: &mut String, count: usize) {
    if count == 0 {
        return;
    }
    for _ in 1..count {
        out.push_str("&nbsp;");
    }
    out.push(' ');
}

fn push_link(out: &mut String, url: &str) {
    let escaped = url.replace('&', "&amp;");
    out.push_str("<a href=\"");
    out.push_str(&escaped);
    out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
    out.push_str(&escaped);
    out.push_str("</a>");
}
