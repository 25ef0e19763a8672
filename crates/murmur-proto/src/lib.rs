//! Wire vocabulary for Murmur
//!
//! Murmur talks to a Socket.IO server over a WebSocket. This crate owns the
//! two text framings involved and the typed chat events carried inside them.
//!
//! # Layers
//!
//! - [`EnginePacket`]: Engine.IO v4 transport packets (open, ping, message...)
//! - [`SocketPacket`]: Socket.IO v5 packets carried inside Engine.IO messages
//! - [`OutboundEvent`] / [`InboundEvent`]: the chat events themselves
//!
//! Binary attachments are not supported; every payload is JSON text.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod engine;
pub mod errors;
pub mod events;
pub mod model;
pub mod packet;

pub use engine::{EnginePacket, OpenPayload};
pub use errors::ProtocolError;
pub use events::{
    FileUpload, InboundEvent, OutboundEvent, PrivateMessage, ReactionUpdate, ReadReceipt,
    ReadUpdate, Reaction, SendMessage,
};
pub use model::{ChatMessage, DEFAULT_ROOM, Id, User};
pub use packet::{PacketKind, SocketPacket};
