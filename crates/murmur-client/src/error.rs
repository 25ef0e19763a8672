//! Client error types.

use murmur_proto::ProtocolError;
use thiserror::Error;

/// Errors returned by [`crate::Client`].
///
/// None of these reach the user: callers log them and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Packet could not be decoded into a known event.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Server refused the namespace connection.
    #[error("connection refused by server: {0}")]
    ConnectRefused(String),
}
