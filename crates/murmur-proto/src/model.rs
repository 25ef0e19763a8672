//! Chat data model shared by the client and the UI.
//!
//! Server payloads are loosely shaped, so every field tolerates absence and
//! values of the wrong type: deserialization falls back to defaults instead of
//! rejecting the message.

use std::fmt;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Room every message without an explicit room belongs to.
pub const DEFAULT_ROOM: &str = "global";

/// Sender name shown when a message carries none.
pub const ANONYMOUS: &str = "Anonymous";

/// Message or user identifier.
///
/// Servers use both numbers (`Date.now()`) and strings (socket ids). Equality
/// is strict: `Int(1)` never equals `Text("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id.
    Int(i64),
    /// String id.
    Text(String),
}

impl Default for Id {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl Id {
    /// Parse user-typed text: digits become [`Id::Int`], anything else text.
    pub fn parse_loose(input: &str) -> Self {
        input.parse::<i64>().map_or_else(|_| Self::Text(input.to_string()), Self::Int)
    }
}

/// An online user as reported in the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Server-assigned id.
    #[serde(deserialize_with = "lenient::id")]
    pub id: Id,
    /// Display name.
    #[serde(deserialize_with = "lenient::string")]
    pub username: String,
}

impl User {
    /// Create a user.
    pub fn new(id: impl Into<Id>, username: impl Into<String>) -> Self {
        Self { id: id.into(), username: username.into() }
    }

    /// Display name, falling back to [`ANONYMOUS`].
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() { ANONYMOUS } else { &self.username }
    }
}

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message id, used to match reaction and read-receipt patches.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient::optional_id")]
    pub id: Option<Id>,
    /// Sender display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient::optional_string")]
    pub sender: Option<String>,
    /// Sender user id (private messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient::optional_id")]
    pub sender_id: Option<Id>,
    /// Message text.
    #[serde(deserialize_with = "lenient::string")]
    pub message: String,
    /// Room name. `None` means [`DEFAULT_ROOM`].
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient::optional_string")]
    pub room: Option<String>,
    /// RFC 3339 timestamp. Epoch milliseconds are converted on receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "lenient::timestamp")]
    pub timestamp: Option<String>,
    /// Reactions as sent by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Value>,
    /// Read receipts as sent by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_by: Option<Value>,
    /// Synthesized join/leave notice.
    #[serde(deserialize_with = "lenient::flag")]
    pub system: bool,
    /// Delivered through the private channel.
    #[serde(deserialize_with = "lenient::flag")]
    pub is_private: bool,
}

impl ChatMessage {
    /// Room this message belongs to.
    pub fn room_or_default(&self) -> &str {
        self.room.as_deref().unwrap_or(DEFAULT_ROOM)
    }

    /// True for a private message that names its sender's id, so it can be
    /// filed under that peer's conversation.
    pub fn has_private_peer(&self) -> bool {
        self.is_private && self.sender_id.is_some()
    }

    /// Sender name, falling back to [`ANONYMOUS`].
    pub fn sender_or_anonymous(&self) -> &str {
        match self.sender.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => ANONYMOUS,
        }
    }

    /// Local wall-clock time of the message (`HH:MM:SS`), or empty.
    pub fn display_time(&self) -> String {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_default()
    }

    /// Compact rendering of attached reactions, e.g. `👍2 🎉1`.
    pub fn reaction_summary(&self) -> Option<String> {
        let Some(Value::Object(map)) = &self.reactions else {
            return None;
        };
        let parts: Vec<String> = map
            .iter()
            .map(|(reaction, who)| match who {
                Value::Array(users) => format!("{reaction}{}", users.len()),
                Value::Number(n) => format!("{reaction}{n}"),
                _ => reaction.clone(),
            })
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(" ")) }
    }

    /// Number of readers, when the server reported any.
    pub fn read_count(&self) -> Option<usize> {
        match &self.read_by {
            Some(Value::Array(readers)) if !readers.is_empty() => Some(readers.len()),
            _ => None,
        }
    }
}

/// Field decoders that map null and mistyped values to the field default.
mod lenient {
    use super::{DateTime, Deserialize, Deserializer, Id, SecondsFormat, Utc, Value};

    fn to_id(value: Value) -> Option<Id> {
        match value {
            Value::Number(n) => n.as_i64().map(Id::Int),
            Value::String(s) => Some(Id::Text(s)),
            _ => None,
        }
    }

    fn to_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub(super) fn id<'de, D: Deserializer<'de>>(de: D) -> Result<Id, D::Error> {
        Ok(to_id(Value::deserialize(de)?).unwrap_or_default())
    }

    pub(super) fn optional_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Id>, D::Error> {
        Ok(to_id(Value::deserialize(de)?))
    }

    pub(super) fn string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
        Ok(to_text(Value::deserialize(de)?).unwrap_or_default())
    }

    pub(super) fn optional_string<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(to_text(Value::deserialize(de)?))
    }

    pub(super) fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        Ok(matches!(Value::deserialize(de)?, Value::Bool(true)))
    }

    pub(super) fn timestamp<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::String(s) => Some(s),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let msg: ChatMessage = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert_eq!(msg.sender_or_anonymous(), "Anonymous");
        assert_eq!(msg.room_or_default(), "global");
        assert_eq!(msg.display_time(), "");
        assert!(!msg.system);
    }

    #[test]
    fn camel_case_fields_are_read() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "id": 17,
            "sender": "bob",
            "senderId": "sock-1",
            "message": "yo",
            "readBy": ["alice"],
            "isPrivate": true,
        }))
        .unwrap();

        assert_eq!(msg.id, Some(Id::Int(17)));
        assert_eq!(msg.sender_id, Some(Id::Text("sock-1".into())));
        assert_eq!(msg.read_count(), Some(1));
        assert!(msg.is_private);
    }

    #[test]
    fn ids_compare_strictly() {
        let numeric: Id = serde_json::from_value(json!(1)).unwrap();
        let text: Id = serde_json::from_value(json!("1")).unwrap();
        assert_ne!(numeric, text);
        assert_eq!(Id::parse_loose("1"), numeric);
        assert_eq!(Id::parse_loose("abc"), Id::Text("abc".into()));
    }

    #[test]
    fn valid_timestamp_renders_clock_time() {
        let msg = ChatMessage {
            timestamp: Some("2024-05-01T10:20:30.000Z".into()),
            ..ChatMessage::default()
        };
        assert_eq!(msg.display_time().len(), 8);

        let bad = ChatMessage { timestamp: Some("yesterday".into()), ..ChatMessage::default() };
        assert_eq!(bad.display_time(), "");
    }

    #[test]
    fn reaction_summary_counts_users() {
        let msg = ChatMessage {
            reactions: Some(json!({"+1": ["a", "b"], "tada": ["c"]})),
            ..ChatMessage::default()
        };
        assert_eq!(msg.reaction_summary().as_deref(), Some("+12 tada1"));
    }

    #[test]
    fn user_without_name_is_anonymous() {
        let user: User = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(user.display_name(), "Anonymous");
    }

    #[test]
    fn mistyped_fields_fall_back_to_defaults() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "id": [1],
            "sender": null,
            "message": null,
            "room": {"name": "design"},
            "system": "yes",
        }))
        .unwrap();

        assert_eq!(msg.id, None);
        assert_eq!(msg.sender_or_anonymous(), "Anonymous");
        assert_eq!(msg.message, "");
        assert_eq!(msg.room_or_default(), "global");
        assert!(!msg.system);
    }

    #[test]
    fn epoch_millis_timestamp_is_converted() {
        let msg: ChatMessage =
            serde_json::from_value(json!({"message": "hi", "timestamp": 1_700_000_000_000_i64}))
                .unwrap();
        assert_eq!(msg.timestamp.as_deref(), Some("2023-11-14T22:13:20.000Z"));
    }

    #[test]
    fn user_with_null_name_is_kept() {
        let user: User = serde_json::from_value(json!({"id": 3, "username": null})).unwrap();
        assert_eq!(user, User::new(3_i64, ""));
        assert_eq!(user.display_name(), "Anonymous");
    }
}
