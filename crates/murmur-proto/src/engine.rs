//! Engine.IO v4 packets.
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by an optional payload.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,..}   open
//! 2                                       ping (server -> client)
//! 3                                       pong
//! 42["receive_message",{..}]              message carrying a Socket.IO packet
//! ```

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Handshake data sent by the server in the `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPayload {
    /// Engine.IO session id.
    pub sid: String,
    /// Transports the server offers to upgrade to.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds.
    pub ping_interval: u64,
    /// Grace period after a missed ping, in milliseconds.
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes.
    #[serde(default)]
    pub max_payload: u64,
}

/// A single Engine.IO packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    /// Session handshake.
    Open(OpenPayload),
    /// Transport close request.
    Close,
    /// Heartbeat ping, with optional probe data.
    Ping(String),
    /// Heartbeat reply, echoing the ping data.
    Pong(String),
    /// Application data (an encoded Socket.IO packet).
    Message(String),
    /// Transport upgrade.
    Upgrade,
    /// No-op.
    Noop,
}

impl EnginePacket {
    /// Decode a packet from a WebSocket text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyPacket)?;
        let data = chars.as_str();

        match kind {
            '0' => Ok(Self::Open(serde_json::from_str(data)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(data.to_string())),
            '3' => Ok(Self::Pong(data.to_string())),
            '4' => Ok(Self::Message(data.to_string())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ProtocolError::UnknownEngineType(other)),
        }
    }

    /// Encode the packet as WebSocket text.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let text = match self {
            Self::Open(open) => format!("0{}", serde_json::to_string(open)?),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(data) => format!("4{data}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        };
        Ok(text)
    }
}
