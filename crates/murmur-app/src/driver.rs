//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use murmur_client::{ChatState, ClientEvent, Notification};
use murmur_proto::SocketPacket;

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the production TUI and in simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio-tungstenite for the socket
/// - **Simulation**: scripted input and an in-memory fake transport
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns `None` if no event is ready.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Receive the next event from the transport.
    ///
    /// Returns `None` if nothing is pending or no transport is open.
    fn recv_event(&mut self) -> impl Future<Output = Option<ClientEvent>> + Send;

    /// Open the transport.
    ///
    /// Success means the attempt started, not that the server answered.
    fn connect(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Close the transport. Idempotent.
    fn disconnect(&mut self);

    /// Send a packet to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if no transport is open or it has shut down.
    fn send_packet(
        &mut self,
        packet: SocketPacket,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Read a local file for upload.
    fn read_file(&mut self, path: &str) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;

    /// Show a notification. Best-effort; must not fail.
    fn notify(&mut self, notification: &Notification);

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App, chat: &ChatState) -> Result<(), Self::Error>;

    /// Stop the transport and clean up resources.
    fn stop(&mut self);
}
