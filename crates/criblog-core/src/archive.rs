//! Chat-export archive model and lenient decoding.
//!
//! An exported archive is a JSON document with a top-level `messages`
//! array. Individual malformed entries are skipped with a warning; only a
//! wholesale-malformed document (invalid JSON, missing `messages`) fails
//! the ingestion, leaving any previously held dataset untouched.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// One entry of the `messages` array, decoded into a flat body string.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Export entry type; only `"message"` entries are eligible for
    /// extraction.
    pub kind: String,
    /// Local timestamp the message was sent at.
    pub timestamp: NaiveDateTime,
    /// Body text with segment lists already concatenated.
    pub body: String,
}

impl RawMessage {
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }
}

/// A decoded chat export.
#[derive(Debug, Clone)]
pub struct Archive {
    pub messages: Vec<RawMessage>,
    /// Entries dropped during lenient decoding.
    pub skipped: usize,
}

impl Archive {
    /// Parse an exported chat document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(raw)
            .map_err(|e| Error::Archive(format!("invalid JSON: {e}")))?;
        let Some(messages) = doc.get("messages") else {
            return Err(Error::Archive("missing `messages` array".into()));
        };
        let Some(items) = messages.as_array() else {
            return Err(Error::Archive("`messages` is not an array".into()));
        };

        let mut decoded = Vec::with_capacity(items.len());
        let mut skipped = 0;
        for (i, item) in items.iter().enumerate() {
            match decode_message(item) {
                Some(msg) => decoded.push(msg),
                None => {
                    skipped += 1;
                    warn!("Skipping malformed message at index {}", i);
                }
            }
        }

        Ok(Self {
            messages: decoded,
            skipped,
        })
    }
}

/// Decode one `messages` entry. `type`, `date` and `text` are required;
/// anything unparseable drops the entry without failing the batch.
fn decode_message(value: &Value) -> Option<RawMessage> {
    let obj = value.as_object()?;
    let kind = obj.get("type")?.as_str()?.to_string();
    let timestamp = obj.get("date")?.as_str()?.parse::<NaiveDateTime>().ok()?;
    let body = flatten_text(obj.get("text")?);
    Some(RawMessage {
        kind,
        timestamp,
        body,
    })
}

/// Concatenate a message body into a single string. Segment lists keep
/// their order; segments that are neither strings nor objects with a
/// `text` field contribute nothing.
fn flatten_text(text: &Value) -> String {
    match text {
        Value::String(s) => s.clone(),
        Value::Array(segments) => segments.iter().map(segment_text).collect(),
        _ => String::new(),
    }
}

fn segment_text(segment: &Value) -> &str {
    match segment {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("text").and_then(Value::as_str).unwrap_or(""),
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_body() {
        let archive = Archive::from_json(
            r#"{"messages":[{"type":"message","date":"2024-01-10T09:15:00","text":"10:00-11:30 сон"}]}"#,
        )
        .unwrap();
        assert_eq!(archive.messages.len(), 1);
        assert_eq!(archive.messages[0].body, "10:00-11:30 сон");
        assert!(archive.messages[0].is_message());
    }

    #[test]
    fn test_segment_list_concatenates_in_order() {
        let archive = Archive::from_json(
            r#"{"messages":[{"type":"message","date":"2024-01-10T09:15:00",
                "text":["09:00 ", {"type":"bold","text":"смесь"}, " 120"]}]}"#,
        )
        .unwrap();
        assert_eq!(archive.messages[0].body, "09:00 смесь 120");
    }

    #[test]
    fn test_non_text_segments_are_empty() {
        let archive = Archive::from_json(
            r#"{"messages":[{"type":"message","date":"2024-01-10T09:15:00",
                "text":["a", 42, {"href":"x"}, null, "b"]}]}"#,
        )
        .unwrap();
        assert_eq!(archive.messages[0].body, "ab");
    }

    #[test]
    fn test_invalid_json_is_archive_error() {
        let err = Archive::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_missing_messages_key_is_archive_error() {
        let err = Archive::from_json(r#"{"name":"export"}"#).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
        assert!(err.to_string().contains("messages"));
    }

    #[test]
    fn test_messages_not_array_is_archive_error() {
        let err = Archive::from_json(r#"{"messages":"oops"}"#).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_malformed_entries_are_skipped_not_fatal() {
        let archive = Archive::from_json(
            r#"{"messages":[
                {"type":"message","date":"2024-01-10T09:15:00","text":"ok"},
                {"type":"message","text":"no date"},
                {"type":"message","date":"not-a-date","text":"bad date"},
                "not even an object",
                {"type":"message","date":"2024-01-10T10:00:00","text":"also ok"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(archive.messages.len(), 2);
        assert_eq!(archive.skipped, 3);
    }

    #[test]
    fn test_empty_messages_array() {
        let archive = Archive::from_json(r#"{"messages":[]}"#).unwrap();
        assert!(archive.messages.is_empty());
        assert_eq!(archive.skipped, 0);
    }

    #[test]
    fn test_non_message_kind_is_kept_for_later_filtering() {
        let archive = Archive::from_json(
            r#"{"messages":[{"type":"service","date":"2024-01-10T09:15:00","text":""}]}"#,
        )
        .unwrap();
        assert_eq!(archive.messages.len(), 1);
        assert!(!archive.messages[0].is_message());
    }
}
