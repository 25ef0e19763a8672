//! Chat events carried in Socket.IO EVENT packets.
//!
//! [`OutboundEvent`] is everything the client emits; [`InboundEvent`] is
//! everything it understands from the server. Connection lifecycle
//! (`connect`/`disconnect`) is signalled by CONNECT/DISCONNECT packets and the
//! transport, not by events, so it does not appear here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ChatMessage, Id, ProtocolError, SocketPacket, User};

/// Room message payload of `send_message`.
///
/// Extra fields are forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Message text.
    pub message: String,
    /// Target room.
    pub room: String,
    /// Additional caller-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SendMessage {
    /// Plain text message to a room.
    pub fn new(message: impl Into<String>, room: impl Into<String>) -> Self {
        Self { message: message.into(), room: room.into(), extra: Map::new() }
    }
}

/// Payload of `send_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    /// Target room.
    pub room: String,
    /// File content, encoded as a data URL.
    pub file: String,
    /// Original file name.
    pub filename: String,
}

/// Payload of `react_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// Message being reacted to.
    pub message_id: Id,
    /// Reaction token (emoji or short name).
    pub reaction: String,
}

/// Payload of `read_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    /// Message that was read.
    pub message_id: Id,
    /// Room of the message.
    pub room: String,
}

/// Payload of an outbound `private_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessage {
    /// Recipient user id.
    pub to: Id,
    /// Message text.
    pub message: String,
}

/// Payload of `message_reacted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionUpdate {
    /// Patched message.
    pub message_id: Id,
    /// Full reaction set, replacing the previous one.
    #[serde(default)]
    pub reactions: Value,
}

/// Payload of `message_read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadUpdate {
    /// Patched message.
    pub message_id: Id,
    /// Full reader set, replacing the previous one.
    #[serde(default)]
    pub read_by: Value,
}

/// Events emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// Announce the username after connecting.
    UserJoin {
        /// Chosen username.
        username: String,
    },
    /// Post a message to a room.
    SendMessage(SendMessage),
    /// Ask the server to join a room.
    JoinRoom {
        /// Room name.
        room: String,
    },
    /// Upload a file to a room.
    SendFile(FileUpload),
    /// React to a message.
    ReactMessage(Reaction),
    /// Mark a message as read.
    ReadMessage(ReadReceipt),
    /// Send a direct message.
    PrivateMessage(PrivateMessage),
    /// Typing indicator on or off.
    Typing(bool),
}

impl OutboundEvent {
    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserJoin { .. } => "user_join",
            Self::SendMessage(_) => "send_message",
            Self::JoinRoom { .. } => "join_room",
            Self::SendFile(_) => "send_file",
            Self::ReactMessage(_) => "react_message",
            Self::ReadMessage(_) => "read_message",
            Self::PrivateMessage(_) => "private_message",
            Self::Typing(_) => "typing",
        }
    }

    /// Event argument as JSON.
    pub fn payload(&self) -> Result<Value, ProtocolError> {
        let value = match self {
            Self::UserJoin { username } => Value::String(username.clone()),
            Self::JoinRoom { room } => Value::String(room.clone()),
            Self::Typing(on) => Value::Bool(*on),
            Self::SendMessage(p) => serde_json::to_value(p)?,
            Self::SendFile(p) => serde_json::to_value(p)?,
            Self::ReactMessage(p) => serde_json::to_value(p)?,
            Self::ReadMessage(p) => serde_json::to_value(p)?,
            Self::PrivateMessage(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Wrap into an EVENT packet on the default namespace.
    pub fn into_packet(self) -> Result<SocketPacket, ProtocolError> {
        Ok(SocketPacket::event(self.name(), self.payload()?))
    }
}

/// Events received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Room message.
    ReceiveMessage(ChatMessage),
    /// Direct message.
    PrivateMessage(ChatMessage),
    /// Full roster.
    UserList(Vec<User>),
    /// A user came online.
    UserJoined(User),
    /// A user went offline.
    UserLeft(User),
    /// Usernames currently typing.
    TypingUsers(Vec<String>),
    /// Rooms known to the server.
    RoomList(Vec<String>),
    /// Server confirmed a room join.
    RoomJoined(String),
    /// Reactions changed on a message.
    MessageReacted(ReactionUpdate),
    /// Readers changed on a message.
    MessageRead(ReadUpdate),
    /// Unread counter, shape defined by the server.
    UnreadCount(Value),
    /// Notification request.
    Notify(Value),
}

impl InboundEvent {
    /// Decode a Socket.IO EVENT packet.
    pub fn from_packet(packet: &SocketPacket) -> Result<Self, ProtocolError> {
        let (name, args) = packet
            .event_parts()
            .ok_or_else(|| ProtocolError::MalformedEvent(format!("{:?}", packet.kind)))?;
        Self::from_parts(name, args)
    }

    /// Decode from an event name and its arguments.
    pub fn from_parts(name: &str, args: &[Value]) -> Result<Self, ProtocolError> {
        let first = args.first().cloned().unwrap_or(Value::Null);

        let event = match name {
            "receive_message" => Self::ReceiveMessage(serde_json::from_value(first)?),
            "private_message" => Self::PrivateMessage(serde_json::from_value(first)?),
            "user_list" => Self::UserList(roster(first)?),
            "user_joined" => Self::UserJoined(serde_json::from_value(first)?),
            "user_left" => Self::UserLeft(serde_json::from_value(first)?),
            "typing_users" => Self::TypingUsers(serde_json::from_value(first)?),
            "room_list" => Self::RoomList(serde_json::from_value(first)?),
            "room_joined" => Self::RoomJoined(serde_json::from_value(first)?),
            "message_reacted" => Self::MessageReacted(serde_json::from_value(first)?),
            "message_read" => Self::MessageRead(serde_json::from_value(first)?),
            "unread_count" => Self::UnreadCount(first),
            "notify" => Self::Notify(first),
            other => return Err(ProtocolError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }

    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveMessage(_) => "receive_message",
            Self::PrivateMessage(_) => "private_message",
            Self::UserList(_) => "user_list",
            Self::UserJoined(_) => "user_joined",
            Self::UserLeft(_) => "user_left",
            Self::TypingUsers(_) => "typing_users",
            Self::RoomList(_) => "room_list",
            Self::RoomJoined(_) => "room_joined",
            Self::MessageReacted(_) => "message_reacted",
            Self::MessageRead(_) => "message_read",
            Self::UnreadCount(_) => "unread_count",
            Self::Notify(_) => "notify",
        }
    }
}

/// Decode a roster array. Entries that are not user objects become
/// [`User::default`] so the roster keeps the length the server sent.
fn roster(value: Value) -> Result<Vec<User>, ProtocolError> {
    let entries: Vec<Value> = serde_json::from_value(value)?;
    Ok(entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn send_message_keeps_extra_fields() {
        let mut payload = SendMessage::new("hi", "global");
        payload.extra.insert("image".into(), json!("data:,"));

        let value = OutboundEvent::SendMessage(payload).payload().unwrap();
        assert_eq!(value, json!({"message": "hi", "room": "global", "image": "data:,"}));
    }

    #[test]
    fn decode_user_list() {
        let event = InboundEvent::from_parts("user_list", &[json!([
            {"id": "a", "username": "alice"},
            {"id": "b", "username": "bob"},
        ])])
        .unwrap();

        let InboundEvent::UserList(users) = event else {
            panic!("expected roster");
        };
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].username, "bob");
    }

    #[test]
    fn roster_tolerates_broken_entries() {
        let event = InboundEvent::from_parts("user_list", &[json!([
            {"id": 1, "username": null},
            "bob",
            {"id": 2, "username": "carol"},
        ])])
        .unwrap();

        let expected = vec![User::new(1_i64, ""), User::default(), User::new(2_i64, "carol")];
        assert_eq!(event, InboundEvent::UserList(expected));
    }

    #[test]
    fn decode_reaction_update() {
        let event = InboundEvent::from_parts("message_reacted", &[json!({
            "messageId": 5,
            "reactions": {"+1": ["bob"]},
        })])
        .unwrap();

        assert_eq!(
            event,
            InboundEvent::MessageReacted(ReactionUpdate {
                message_id: Id::Int(5),
                reactions: json!({"+1": ["bob"]}),
            })
        );
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert_eq!(
            InboundEvent::from_parts("server_shutdown", &[]),
            Err(ProtocolError::UnknownEvent("server_shutdown".into()))
        );
    }

    #[test]
    fn missing_argument_is_a_json_error() {
        assert!(matches!(
            InboundEvent::from_parts("receive_message", &[]),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn notify_and_unread_are_passed_through() {
        let event = InboundEvent::from_parts("unread_count", &[json!({"global": 3})]).unwrap();
        assert_eq!(event.name(), "unread_count");
    }
}
