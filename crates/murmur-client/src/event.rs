//! Client events and actions.

use murmur_proto::SocketPacket;

/// Events the caller feeds into the client.
///
/// The caller (a transport or a simulation) is responsible for:
/// - Reporting connection lifecycle changes
/// - Delivering Socket.IO packets received from the server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Namespace connected (server acknowledged CONNECT).
    Connected,

    /// Connection lost or closed.
    Disconnected {
        /// Human-readable cause, for logs only.
        reason: String,
    },

    /// Packet received from the server.
    PacketReceived(SocketPacket),
}

/// User-facing notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Open the transport connection.
    Connect,

    /// Tear down the transport connection. Idempotent.
    Disconnect,

    /// Send a packet to the server.
    Send(SocketPacket),

    /// Show a notification. Best-effort; failures must be ignored.
    Notify(Notification),
}
