//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the [`crate::App`]
//! state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and periodic ticks.
//! - Chat updates translated by the [`crate::Bridge`].

use murmur_proto::{ChatMessage, Id};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Observable chat state changed.
    ChatUpdated,

    /// Direct message sent; the copy is shown before any echo.
    PrivateMessageSent {
        /// Recipient user id.
        to: Id,
        /// Locally built copy of the message.
        message: ChatMessage,
    },

    /// Direct message received from a known sender.
    PrivateMessageReceived {
        /// Sender user id.
        from: Id,
        /// Received message.
        message: ChatMessage,
    },

    /// Local operation failed (e.g. a file could not be read).
    Error {
        /// Error description.
        message: String,
    },
}
