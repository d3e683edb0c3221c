//! Gmail API message JSON (`users.messages.get?format=full`) to [`MimeNode`].
//!
//! This is the construction boundary for the MIME tree: content types are
//! parsed once, empty bodies become `None` and attachment bodies are dropped,
//! so the resolver never has to re-check shapes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MsgBodyError, Result};
use crate::model::content::ResolvedContent;
use crate::model::node::MimeNode;
use crate::resolve::Resolver;

/// A message as returned by the Gmail API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Short HTML-escaped preview generated by Gmail.
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    pub payload: MessagePart,
}

/// One node of the Gmail payload tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub part_id: String,
    pub mime_type: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<MessagePartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePartBody {
    /// Set when the content must be fetched separately.
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// base64url-encoded content.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl MessagePart {
    /// An attachment: carries an `attachmentId` or a file name.
    pub fn is_attachment(&self) -> bool {
        !self.filename.is_empty()
            || self
                .body
                .as_ref()
                .is_some_and(|b| b.attachment_id.is_some())
    }

    /// First header value named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Build the resolver's tree. Attachments keep their type but lose their body.
    pub fn to_mime_node(&self) -> MimeNode {
        let raw_body = if self.is_attachment() {
            None
        } else {
            self.body.as_ref().and_then(|b| b.data.clone())
        };
        let children = self.parts.iter().map(MessagePart::to_mime_node).collect();
        MimeNode::new(self.mime_type.as_str(), raw_body, children)
    }
}

impl GmailMessage {
    pub fn subject(&self) -> Option<&str> {
        self.payload.header("Subject")
    }

    pub fn to_mime_node(&self) -> MimeNode {
        self.payload.to_mime_node()
    }

    /// Resolve this message's body, using the snippet as fallback.
    pub fn resolve_with(&self, resolver: &Resolver) -> ResolvedContent {
        let tree = self.to_mime_node();
        resolver.resolve(&tree, self.snippet.as_deref())
    }
}

/// Parse a message from JSON.
///
/// Accepts a full message (`{"id":…, "payload":{…}}`) or a bare payload
/// (`{"mimeType":…}`); a bare payload yields an empty id and no snippet.
pub fn parse_message(json: &str) -> Result<GmailMessage> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let Some(object) = value.as_object() else {
        return Err(MsgBodyError::InvalidMessage(
            "expected a JSON object".to_string(),
        ));
    };

    if object.contains_key("payload") {
        Ok(serde_json::from_value(value)?)
    } else if object.contains_key("mimeType") {
        let payload: MessagePart = serde_json::from_value(value)?;
        Ok(GmailMessage {
            payload,
            ..GmailMessage::default()
        })
    } else {
        Err(MsgBodyError::InvalidMessage(
            "object has neither \"payload\" nor \"mimeType\"".to_string(),
        ))
    }
}

/// Read and parse a message file.
pub fn load_message(path: impl AsRef<Path>) -> Result<GmailMessage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MsgBodyError::FileNotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path).map_err(|e| MsgBodyError::io(path, e))?;
    let message = parse_message(&json)?;
    debug!(path = %path.display(), id = %message.id, "Loaded message");
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::MimeType;

    const ALTERNATIVE: &str = r#"{
        "id": "18c2f0a1b2c3d4e5",
        "threadId": "18c2f0a1b2c3d4e5",
        "snippet": "hi",
        "labelIds": ["INBOX", "UNREAD"],
        "payload": {
            "partId": "",
            "mimeType": "multipart/alternative",
            "filename": "",
            "headers": [{"name": "Subject", "value": "Greetings"}],
            "body": {"size": 0},
            "parts": [
                {"partId": "0", "mimeType": "text/plain", "filename": "",
                 "body": {"size": 2, "data": "aGk"}},
                {"partId": "1", "mimeType": "text/html; charset=UTF-8", "filename": "",
                 "body": {"size": 9, "data": "PGI-aGk8L2I-"}}
            ]
        }
    }"#;

    #[test]
    fn test_parse_full_message() {
        let msg = parse_message(ALTERNATIVE).unwrap();
        assert_eq!(msg.id, "18c2f0a1b2c3d4e5");
        assert_eq!(msg.snippet.as_deref(), Some("hi"));
        assert_eq!(msg.label_ids, ["INBOX", "UNREAD"]);
        assert_eq!(msg.subject(), Some("Greetings"));

        let tree = msg.to_mime_node();
        assert_eq!(tree.mime_type(), &MimeType::MultipartAlternative);
        assert_eq!(tree.raw_body(), None);
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.children()[1].mime_type(), &MimeType::TextHtml);
    }

    #[test]
    fn test_resolve_with_prefers_html() {
        let msg = parse_message(ALTERNATIVE).unwrap();
        let resolved = msg.resolve_with(&Resolver::default());
        assert!(resolved.is_html());
        assert!(resolved.body.contains("<b>hi</b>"));
    }

    #[test]
    fn test_parse_bare_payload() {
        let msg = parse_message(r#"{"mimeType": "text/plain", "body": {"data": "aGk"}}"#).unwrap();
        assert!(msg.id.is_empty());
        assert!(msg.snippet.is_none());
        assert_eq!(msg.to_mime_node().raw_body(), Some("aGk"));
    }

    #[test]
    fn test_attachment_body_dropped() {
        let json = r#"{"mimeType": "multipart/mixed", "parts": [
            {"mimeType": "text/plain", "filename": "notes.txt",
             "body": {"attachmentId": "ANGjdJ8", "size": 120}},
            {"mimeType": "text/plain", "filename": "inline.txt",
             "body": {"data": "aGk", "size": 2}}
        ]}"#;
        let tree = parse_message(json).unwrap().to_mime_node();
        assert!(tree.children().iter().all(|c| c.raw_body().is_none()));
    }

    #[test]
    fn test_empty_data_is_no_body() {
        let msg = parse_message(r#"{"mimeType": "text/html", "body": {"data": ""}}"#).unwrap();
        assert_eq!(msg.to_mime_node().raw_body(), None);
    }

    #[test]
    fn test_rejects_unrelated_json() {
        assert!(matches!(
            parse_message(r#"{"kind": "label"}"#),
            Err(MsgBodyError::InvalidMessage(_))
        ));
        assert!(matches!(
            parse_message("[1, 2]"),
            Err(MsgBodyError::InvalidMessage(_))
        ));
        assert!(matches!(parse_message("{"), Err(MsgBodyError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.json");
        assert!(matches!(
            load_message(&missing),
            Err(MsgBodyError::FileNotFound(_))
        ));
    }
}
