//! Values produced while resolving a message body.

use serde::{Deserialize, Serialize};

use super::node::MimeType;

/// Whether a resolved body is markup or plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Html,
    PlainText,
}

/// The text of the selected part, after base64url decoding but before
/// mojibake repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCandidate {
    /// Declared type of the part the text came from.
    pub source_mime_type: MimeType,
    /// Decoded text, or the raw undecoded body when decoding failed.
    pub text: String,
    pub decode_succeeded: bool,
}

/// Final output of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContent {
    /// Markup ready to be assigned as render content.
    ///
    /// HTML bodies are passed through as the sender wrote them, scripts
    /// included. Callers must sandbox or sanitize before display.
    pub body: String,
    pub content_kind: ContentKind,
    /// Set when no part decoded and a snippet or the raw body was used.
    pub used_fallback: bool,
}

impl ResolvedContent {
    /// A plain-text fallback result carrying `body` verbatim.
    pub fn fallback(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_kind: ContentKind::PlainText,
            used_fallback: true,
        }
    }

    pub fn is_html(&self) -> bool {
        self.content_kind == ContentKind::Html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_plain_text() {
        let resolved = ResolvedContent::fallback("snippet");
        assert_eq!(resolved.body, "snippet");
        assert_eq!(resolved.content_kind, ContentKind::PlainText);
        assert!(resolved.used_fallback);
        assert!(!resolved.is_html());
    }

    #[test]
    fn test_serialize_kind_snake_case() {
        let json = serde_json::to_string(&ContentKind::PlainText).unwrap();
        assert_eq!(json, "\"plain_text\"");
    }
}
