//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use murmur_proto::Id;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect and announce the username.
    Connect {
        /// Trimmed, non-empty username.
        username: String,
    },

    /// Close the connection.
    Disconnect,

    /// Post a message to a room.
    SendMessage {
        /// Target room.
        room: String,
        /// Trimmed message text.
        message: String,
    },

    /// Send a direct message.
    SendPrivateMessage {
        /// Recipient user id.
        to: Id,
        /// Trimmed message text.
        message: String,
    },

    /// Turn the typing indicator on or off.
    SetTyping(bool),

    /// Ask the server to join a room.
    JoinRoom {
        /// Room name.
        room: String,
    },

    /// Upload a local file to a room.
    SendFile {
        /// Target room.
        room: String,
        /// Local path, read by the driver.
        path: String,
    },

    /// React to a message.
    ReactMessage {
        /// Target message id.
        message_id: Id,
        /// Reaction text (usually an emoji).
        reaction: String,
    },

    /// Mark a message as read.
    ReadMessage {
        /// Target message id.
        message_id: Id,
        /// Room the message belongs to.
        room: String,
    },
}
