//! Protocol error types.

use thiserror::Error;

/// Errors produced while decoding or encoding packets and events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Packet text was empty.
    #[error("empty packet")]
    EmptyPacket,

    /// Unknown Engine.IO packet type.
    #[error("unknown engine packet type: {0:?}")]
    UnknownEngineType(char),

    /// Unknown Socket.IO packet type.
    #[error("unknown socket packet type: {0:?}")]
    UnknownPacketType(char),

    /// Binary packets carry attachments outside the text frame.
    #[error("binary packets are not supported")]
    BinaryUnsupported,

    /// Namespace was opened with `/` but never terminated by `,`.
    #[error("unterminated namespace in packet")]
    UnterminatedNamespace,

    /// Payload was not valid JSON or did not match the expected shape.
    #[error("invalid JSON payload: {0}")]
    Json(String),

    /// Event packet without an `[name, ...args]` array.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Event name outside the known vocabulary.
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
