//! Observable chat state.
//!
//! [`ChatState`] is what the bridge exposes to the view: connection status,
//! the message sequence, the roster and the typing set. It is only mutated by
//! [`crate::Client`]; everything else reads it.

use murmur_proto::{ChatMessage, User};
use serde_json::Value;

/// Transport connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not connected (initial, after leaving, or after the link dropped).
    #[default]
    Disconnected,
    /// Connect requested, waiting for the namespace ack.
    Connecting,
    /// Namespace connected; events flow.
    Connected,
}

/// Everything the bridge knows about the chat.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Connection status.
    pub status: ConnectionStatus,
    /// Username announced on connect. `None` before the first connect.
    pub username: Option<String>,
    /// All received and synthesized messages, in receipt order.
    pub messages: Vec<ChatMessage>,
    /// Most recent room or private message.
    pub last_message: Option<ChatMessage>,
    /// Online users as last reported.
    pub users: Vec<User>,
    /// Usernames currently typing.
    pub typing_users: Vec<String>,
    /// Rooms announced by the server. Kept apart from the local room list.
    pub announced_rooms: Vec<String>,
    /// Last room the server confirmed joining.
    pub last_joined_room: Option<String>,
    /// Last unread counter reported by the server.
    pub unread_count: Option<Value>,
}

impl ChatState {
    /// True when events can be sent and received.
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Messages visible in `room`, in receipt order.
    ///
    /// A message without a room belongs to the default room. Private
    /// messages with a `senderId` belong to that peer's conversation instead;
    /// those without one stay in the feed.
    pub fn room_feed<'a>(&'a self, room: &'a str) -> impl Iterator<Item = &'a ChatMessage> + 'a {
        self.messages
            .iter()
            .filter(move |m| !m.has_private_peer() && m.room_or_default() == room)
    }

    /// Roster without the user named `me`.
    pub fn others<'a>(&'a self, me: &'a str) -> impl Iterator<Item = &'a User> + 'a {
        self.users.iter().filter(move |u| u.username != me)
    }

    /// Typing indicator text for everyone but `me`, e.g. `bob, carol typing...`.
    pub fn typing_line(&self, me: &str) -> Option<String> {
        let others: Vec<&str> =
            self.typing_users.iter().map(String::as_str).filter(|u| *u != me).collect();
        if others.is_empty() { None } else { Some(format!("{} typing...", others.join(", "))) }
    }
}
