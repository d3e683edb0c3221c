//! Mojibake repair: UTF-8 text that was once decoded as Windows-1252 and
//! re-encoded, plus invisible characters and quoting left by some exports.

/// Known double-encoding artifacts, applied in order.
///
/// Three-character `â€x` sequences come first so the bare `â€` entry at the
/// end only catches a right double quote whose last byte was dropped.
pub const MOJIBAKE_TABLE: &[(&str, &str)] = &[
    ("\u{E2}\u{20AC}\u{2122}", "\u{2019}"),
    ("\u{E2}\u{20AC}\u{2DC}", "\u{2018}"),
    ("\u{E2}\u{20AC}\u{153}", "\u{201C}"),
    ("\u{E2}\u{20AC}\u{9D}", "\u{201D}"),
    ("\u{E2}\u{20AC}\u{201C}", "\u{2013}"),
    ("\u{E2}\u{20AC}\u{201D}", "\u{2014}"),
    ("\u{E2}\u{20AC}\u{A6}", "\u{2026}"),
    ("\u{E2}\u{20AC}\u{A2}", "\u{2022}"),
    ("\u{E2}\u{201A}\u{AC}", "\u{20AC}"),
    ("\u{E2}\u{201E}\u{A2}", "\u{2122}"),
    ("\u{E2}\u{20AC}", "\u{201D}"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ãª", "ê"),
    ("Ã«", "ë"),
    ("Ã¡", "á"),
    ("Ã\u{A0}", "à"),
    ("Ã¢", "â"),
    ("Ã¤", "ä"),
    ("Ã§", "ç"),
    ("Ã\u{AD}", "í"),
    ("Ã®", "î"),
    ("Ã¯", "ï"),
    ("Ã±", "ñ"),
    ("Ã³", "ó"),
    ("Ã´", "ô"),
    ("Ã¶", "ö"),
    ("Ãº", "ú"),
    ("Ã¹", "ù"),
    ("Ã¼", "ü"),
    ("Ã\u{2030}", "É"),
    ("Ã\u{2018}", "Ñ"),
    ("Ã\u{201C}", "Ó"),
    ("Ã\u{153}", "Ü"),
    ("Ã\u{178}", "ß"),
    ("Â\u{A0}", "\u{A0}"),
    ("Â©", "©"),
    ("Â®", "®"),
    ("Â°", "°"),
    ("Â£", "£"),
    ("Â§", "§"),
    ("Â«", "«"),
    ("Â»", "»"),
    ("Â·", "·"),
    ("Â¿", "¿"),
    ("Â¡", "¡"),
];

/// Zero-width and bidi control characters.
fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// Repair decoded body text.
///
/// Strips invisible characters, applies [`MOJIBAKE_TABLE`], drops lines that
/// hold only a stray `"` and unwraps text enclosed in pairs of `"`. Each step
/// is repeated until it stops changing the text, so `repair` is idempotent
/// even when a substitution exposes a new pattern (triple-encoded text).
pub fn repair(text: &str) -> String {
    let mut out: String = text.chars().filter(|&c| !is_invisible(c)).collect();
    while apply_table(&mut out) {}

    // Quote cleanup only removes whole lines or characters at the ends, so it
    // cannot form a new table pattern.
    loop {
        let next = unwrap_enclosing_quotes(&remove_stray_quote_lines(&out)).to_string();
        if next.len() == out.len() {
            return out;
        }
        out = next;
    }
}

/// One ordered pass over the table. Returns whether anything was replaced.
fn apply_table(text: &mut String) -> bool {
    let mut replaced = false;
    for (pattern, replacement) in MOJIBAKE_TABLE {
        if text.contains(pattern) {
            *text = text.replace(pattern, replacement);
            replaced = true;
        }
    }
    replaced
}

fn remove_stray_quote_lines(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| line.trim() != "\"")
        .collect()
}

fn unwrap_enclosing_quotes(text: &str) -> &str {
    let mut current = text;
    loop {
        let trimmed = current.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            current = &trimmed[1..trimmed.len() - 1];
        } else {
            return current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_repair_smart_quotes() {
        assert_eq!(repair("It\u{E2}\u{20AC}\u{2122}s here"), "It\u{2019}s here");
        assert_eq!(
            repair("\u{E2}\u{20AC}\u{153}Quoted\u{E2}\u{20AC}\u{9D} text"),
            "\u{201C}Quoted\u{201D} text"
        );
        assert_eq!(repair("wait \u{E2}\u{20AC}\u{201D} what"), "wait \u{2014} what");
        assert_eq!(repair("1\u{E2}\u{20AC}\u{201C}2"), "1\u{2013}2");
    }

    #[test]
    fn test_repair_latin_accents() {
        assert_eq!(repair("CafÃ© con leÃ±a"), "Café con leña");
        assert_eq!(repair("MÃ¼ller"), "Müller");
        assert_eq!(repair("Â© 2024"), "© 2024");
        assert_eq!(repair("Â£5 \u{E2}\u{201A}\u{AC}5"), "£5 \u{20AC}5");
    }

    #[test]
    fn test_repair_triple_encoding_reaches_fixpoint() {
        // ’ encoded three times collapses over successive passes.
        assert_eq!(
            repair("ItÃ¢\u{E2}\u{201A}\u{AC}\u{E2}\u{201E}\u{A2}s"),
            "It\u{2019}s"
        );
    }

    #[test]
    fn test_strip_invisible_characters() {
        assert_eq!(repair("zero\u{200B}width\u{200D}join\u{202E}"), "zerowidthjoin");
        assert_eq!(repair("\u{FEFF}bom"), "bom");
        // Non-breaking space is layout, not an artifact.
        assert_eq!(repair("a\u{A0}b"), "a\u{A0}b");
    }

    #[test]
    fn test_unwrap_enclosing_quotes() {
        assert_eq!(repair("  \"Hello there\"\n"), "Hello there");
        assert_eq!(repair("say \"hi\""), "say \"hi\"");
        assert_eq!(repair("\""), "");
    }

    #[test]
    fn test_unwrap_deeply_nested_quotes() {
        let n = 100_000;
        let text = format!("{}x{}", "\"".repeat(n), "\"".repeat(n));
        let start = std::time::Instant::now();
        assert_eq!(repair(&text), "x");
        assert!(start.elapsed() < std::time::Duration::from_secs(2));

        assert_eq!(repair("\"\"Hi\"\""), "Hi");
        assert_eq!(repair("\"a\"\n\""), "a");
    }

    #[test]
    fn test_remove_stray_quote_lines() {
        assert_eq!(repair("line one\n\"\nline two\n"), "line one\nline two\n");
        assert_eq!(repair("keep \"this\"\n  \"  \nend"), "keep \"this\"\nend");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let text = "Plain message.\n\nRegards,\nAna";
        assert_eq!(repair(text), text);
    }

    proptest! {
        #[test]
        fn prop_repair_is_idempotent(text in any::<String>()) {
            let once = repair(&text);
            prop_assert_eq!(repair(&once), once);
        }

        #[test]
        fn prop_repair_idempotent_on_artifact_soup(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("\u{E2}\u{20AC}"), Just("\u{2122}"), Just("Ã"), Just("Â"), Just("©"),
                    Just("\""), Just("\n"), Just("\u{200B}"), Just(" "), Just("x"),
                ],
                0..24,
            )
        ) {
            let text: String = parts.concat();
            let once = repair(&text);
            prop_assert_eq!(repair(&once), once);
        }
    }
}
