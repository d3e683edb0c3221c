//! The MIME tree handed to the resolver.

use std::fmt;

/// Content type of a MIME part, reduced to the kinds the selector cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MimeType {
    TextHtml,
    TextPlain,
    MultipartAlternative,
    MultipartRelated,
    MultipartMixed,
    /// Any other type, stored as its lowercase essence (`image/png`).
    Other(String),
}

impl MimeType {
    /// Parse a `Content-Type` value.
    ///
    /// Matching is case-insensitive and parameters after `;` are ignored,
    /// so `"Text/HTML; charset=UTF-8"` is [`MimeType::TextHtml`].
    pub fn parse(value: &str) -> Self {
        let essence = value
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/html" => Self::TextHtml,
            "text/plain" => Self::TextPlain,
            "multipart/alternative" => Self::MultipartAlternative,
            "multipart/related" => Self::MultipartRelated,
            "multipart/mixed" => Self::MultipartMixed,
            _ => Self::Other(essence),
        }
    }

    /// `text/html` or `text/plain`.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::TextHtml | Self::TextPlain)
    }

    pub fn is_multipart(&self) -> bool {
        match self {
            Self::MultipartAlternative | Self::MultipartRelated | Self::MultipartMixed => true,
            Self::Other(essence) => essence.starts_with("multipart/"),
            _ => false,
        }
    }

    /// Canonical lowercase essence.
    pub fn as_str(&self) -> &str {
        match self {
            Self::TextHtml => "text/html",
            Self::TextPlain => "text/plain",
            Self::MultipartAlternative => "multipart/alternative",
            Self::MultipartRelated => "multipart/related",
            Self::MultipartMixed => "multipart/mixed",
            Self::Other(essence) => essence,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MimeType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// One node of a message's content tree.
///
/// Built once by whoever fetched the message (see [`crate::parser::gmail`])
/// and only ever borrowed by the resolver. A node may carry both a body and
/// children; for multipart types the children win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeNode {
    mime_type: MimeType,
    raw_body: Option<String>,
    children: Vec<MimeNode>,
}

impl MimeNode {
    /// Build a node. An empty `raw_body` is stored as `None`.
    pub fn new(
        mime_type: impl Into<MimeType>,
        raw_body: Option<String>,
        children: Vec<MimeNode>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            raw_body: raw_body.filter(|b| !b.is_empty()),
            children,
        }
    }

    /// A content-bearing part with a base64url body.
    pub fn leaf(mime_type: impl Into<MimeType>, raw_body: impl Into<String>) -> Self {
        Self::new(mime_type, Some(raw_body.into()), Vec::new())
    }

    /// A container part.
    pub fn multipart(mime_type: impl Into<MimeType>, children: Vec<MimeNode>) -> Self {
        Self::new(mime_type, None, children)
    }

    /// A part with neither body nor children.
    pub fn empty(mime_type: impl Into<MimeType>) -> Self {
        Self::new(mime_type, None, Vec::new())
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    /// The base64url payload, never `Some("")`.
    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    pub fn children(&self) -> &[MimeNode] {
        &self.children
    }

    /// True if this node is of type `mime` and has a non-empty body.
    pub fn has_body_of(&self, mime: &MimeType) -> bool {
        &self.mime_type == mime && self.raw_body.is_some()
    }

    /// Depth of the deepest branch (a lone node has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(MimeNode::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mime_type_ignores_case_and_params() {
        assert_eq!(MimeType::parse("text/html"), MimeType::TextHtml);
        assert_eq!(
            MimeType::parse("Text/HTML; charset=\"UTF-8\""),
            MimeType::TextHtml
        );
        assert_eq!(
            MimeType::parse(" multipart/Alternative ; boundary=x"),
            MimeType::MultipartAlternative
        );
        assert_eq!(
            MimeType::parse("IMAGE/PNG"),
            MimeType::Other("image/png".to_string())
        );
    }

    #[test]
    fn test_mime_type_display() {
        assert_eq!(MimeType::MultipartMixed.to_string(), "multipart/mixed");
        assert_eq!(MimeType::parse("Application/PDF").to_string(), "application/pdf");
    }

    #[test]
    fn test_other_multipart_is_multipart() {
        assert!(MimeType::parse("multipart/report").is_multipart());
        assert!(!MimeType::TextPlain.is_multipart());
    }

    #[test]
    fn test_empty_body_is_none() {
        let node = MimeNode::leaf("text/plain", "");
        assert_eq!(node.raw_body(), None);
        assert!(!node.has_body_of(&MimeType::TextPlain));
    }

    #[test]
    fn test_depth() {
        let tree = MimeNode::multipart(
            "multipart/mixed",
            vec![
                MimeNode::multipart(
                    "multipart/alternative",
                    vec![MimeNode::leaf("text/plain", "aGk=")],
                ),
                MimeNode::empty("image/png"),
            ],
        );
        assert_eq!(tree.depth(), 3);
    }
}
