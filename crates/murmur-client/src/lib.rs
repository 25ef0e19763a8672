//! Client
//!
//! Action-based connection and event bridge for Murmur chat. Wraps the
//! Socket.IO event vocabulary and owns the observable chat state.
//!
//! # Architecture
//!
//! The client is Sans-IO. It receives events ([`ClientEvent`]), applies them
//! to [`ChatState`], and returns actions ([`ClientAction`]) for the caller to
//! execute. Outbound operations are methods on [`Client`] that return the
//! packet to send.
//!
//! # Components
//!
//! - [`Client`]: Connection and event bridge state machine
//! - [`ChatState`]: Messages, roster, typing set and connection status
//! - [`ClientEvent`]: Events fed into the client
//! - [`ClientAction`]: Actions produced by the client
//! - [`Environment`]: Wall-clock source for synthesized messages
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: Channels to a running WebSocket session
//! - [`transport::connect`]: Spawn a session with bounded reconnection

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod env;
mod error;
mod event;
mod state;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::{Client, NOTIFICATION_FALLBACK, NOTIFICATION_TITLE};
pub use env::{Environment, SystemEnv};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, Notification};
pub use state::{ChatState, ConnectionStatus};
