//! One-line text previews of resolved bodies, for message lists.

use crate::model::content::ResolvedContent;

/// Block-level tags that separate words when stripped.
const BLOCK_TAGS: &[&str] = &[
    "br", "p", "div", "tr", "td", "li", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Reduce a resolved body to at most `max_chars` characters of plain text.
///
/// - Drops `<script>`, `<style>` and `<head>` blocks
/// - Treats block elements and `<br>` as word breaks
/// - Strips the remaining tags and decodes common entities
/// - Collapses all whitespace to single spaces
/// - Truncates on a character boundary, marking the cut with `…`
pub fn preview_text(content: &ResolvedContent, max_chars: usize) -> String {
    let text = html_to_text(&content.body);
    truncate_chars(&text, max_chars)
}

/// Strip markup from `html`, returning whitespace-collapsed text.
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();
    for block in ["script", "style", "head"] {
        text = remove_tag_block(&text, block);
    }

    // Break before every block-level tag so adjacent cells do not merge.
    let lower = text.to_ascii_lowercase();
    let mut spaced = String::with_capacity(text.len());
    let mut last = 0;
    for (pos, _) in lower.match_indices('<') {
        let rest = lower[pos + 1..].trim_start_matches('/');
        let is_block = BLOCK_TAGS.iter().any(|tag| {
            rest.starts_with(tag)
                && rest[tag.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
        });
        if is_block {
            spaced.push_str(&text[last..pos]);
            spaced.push(' ');
            last = pos;
        }
    }
    spaced.push_str(&text[last..]);

    let mut stripped = String::with_capacity(spaced.len());
    let mut in_tag = false;
    for ch in spaced.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }

    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove an entire tag block (e.g. `<script>…</script>`), case-insensitively.
fn remove_tag_block(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();

    let mut result = String::with_capacity(html.len());
    let mut cursor = 0;
    let mut search_from = 0;
    while let Some(start) = lower[search_from..].find(&open).map(|p| p + search_from) {
        let after = start + open.len();
        // `<header>` is not `<head>`.
        let opens_element = lower[after..]
            .chars()
            .next()
            .is_none_or(|c| c == '>' || c == '/' || c.is_ascii_whitespace());
        if !opens_element {
            search_from = after;
            continue;
        }
        result.push_str(&html[cursor..start]);
        match lower[start..].find(&close) {
            Some(end) => {
                cursor = start + end + close.len();
                search_from = cursor;
            }
            None => {
                // No closing tag, drop the rest.
                cursor = html.len();
                break;
            }
        }
    }
    result.push_str(&html[cursor..]);
    result
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some(_) if max_chars == 0 => String::new(),
        Some(_) => {
            let keep: String = text.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{}…", keep.trim_end())
        }
    }
}
