//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`murmur_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use murmur_app::{App, AppEvent, Driver, KeyInput, Runtime};
use murmur_client::{ChatState, ClientEvent, Environment, Notification};
use murmur_proto::SocketPacket;

use crate::invariants::{InvariantRegistry, ViewSnapshot};

/// Upper bound on steps taken by [`run_until_idle`].
const MAX_IDLE_STEPS: usize = 10_000;

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Shared state for event injection and inspection.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    incoming: VecDeque<ClientEvent>,
    sent: Vec<SocketPacket>,
    open: bool,
    refuse_connect: bool,
    connects: usize,
    disconnects: usize,
    files: HashMap<String, Vec<u8>>,
    notifications: Vec<Notification>,
    renders: usize,
}

/// Simulation driver for deterministic testing.
///
/// Clones share the same state, so a test can keep a handle for injection
/// and inspection after moving the driver into a [`Runtime`].
///
/// Opening the transport acknowledges the namespace immediately unless
/// [`SimDriver::refuse_connections`] was called.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), invariants: None }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a key press.
    pub fn press(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject one key press per character of `text`.
    pub fn type_text(&self, text: &str) {
        let mut state = self.lock();
        state.pending_events.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
    }

    /// Type `text` and press Enter.
    pub fn submit(&self, text: &str) {
        self.type_text(text);
        self.press(KeyInput::Enter);
    }

    /// Inject a transport event.
    pub fn inject_client_event(&self, event: ClientEvent) {
        self.lock().incoming.push_back(event);
    }

    /// Inject a server event as it would arrive on the socket.
    pub fn inject_server_event(&self, name: &str, payload: serde_json::Value) {
        self.inject_client_event(ClientEvent::PacketReceived(SocketPacket::event(name, payload)));
    }

    /// Make future connects fail.
    pub fn refuse_connections(&self) {
        self.lock().refuse_connect = true;
    }

    /// Register an in-memory file for `read_file`.
    pub fn add_file(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.lock().files.insert(path.to_string(), contents.into());
    }

    /// Take all captured outgoing packets.
    pub fn take_sent(&self) -> Vec<SocketPacket> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Names of all captured outgoing events, without draining them.
    pub fn sent_event_names(&self) -> Vec<String> {
        self.lock()
            .sent
            .iter()
            .filter_map(|p| p.event_parts().map(|(name, _)| name.to_string()))
            .collect()
    }

    /// Take all notifications shown so far.
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut self.lock().notifications)
    }

    /// Whether the transport is open.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Number of connect calls.
    pub fn connects(&self) -> usize {
        self.lock().connects
    }

    /// Number of times an open transport was closed.
    pub fn disconnects(&self) -> usize {
        self.lock().disconnects
    }

    /// Number of frames rendered.
    pub fn renders(&self) -> usize {
        self.lock().renders
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        !state.pending_events.is_empty() || !state.incoming.is_empty()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    async fn recv_event(&mut self) -> Option<ClientEvent> {
        self.lock().incoming.pop_front()
    }

    async fn connect(&mut self) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.connects += 1;
        if state.refuse_connect {
            return Err(SimDriverError("connection refused".to_string()));
        }
        state.open = true;
        state.incoming.push_back(ClientEvent::Connected);
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut state = self.lock();
        if state.open {
            state.open = false;
            state.disconnects += 1;
        }
    }

    async fn send_packet(&mut self, packet: SocketPacket) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if !state.open {
            return Err(SimDriverError("not connected".to_string()));
        }
        tracing::trace!(packet = %packet.encode(), "sim send");
        state.sent.push(packet);
        Ok(())
    }

    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>, Self::Error> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| SimDriverError(format!("no such file: {path}")))
    }

    fn notify(&mut self, notification: &Notification) {
        self.lock().notifications.push(notification.clone());
    }

    fn render(&mut self, app: &App, chat: &ChatState) -> Result<(), Self::Error> {
        self.lock().renders += 1;

        if let Some(registry) = &self.invariants {
            let snapshot = ViewSnapshot::capture(app, chat);
            if let Err(violations) = registry.check_all(&snapshot) {
                let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
                return Err(SimDriverError(format!(
                    "invariant violation:\n  {}",
                    messages.join("\n  ")
                )));
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.disconnect();
    }
}

/// Step `runtime` until the driver has nothing pending.
///
/// Returns `true` if the App asked to quit.
pub async fn run_until_idle<E: Environment>(
    runtime: &mut Runtime<SimDriver, E>,
) -> Result<bool, SimDriverError> {
    for _ in 0..MAX_IDLE_STEPS {
        if !runtime.driver().has_pending() {
            return Ok(false);
        }
        if runtime.step().await? {
            return Ok(true);
        }
    }
    Err(SimDriverError(format!("still busy after {MAX_IDLE_STEPS} steps")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_text_queues_one_key_per_char() {
        let driver = SimDriver::new();
        driver.type_text("hi");

        let state = driver.lock();
        assert_eq!(state.pending_events.len(), 2);
        assert_eq!(state.pending_events[0], AppEvent::Key(KeyInput::Char('h')));
    }

    #[tokio::test]
    async fn connect_acknowledges_namespace() {
        let mut driver = SimDriver::new();
        driver.connect().await.unwrap();

        assert!(driver.is_open());
        assert_eq!(driver.recv_event().await, Some(ClientEvent::Connected));
    }

    #[tokio::test]
    async fn send_requires_open_transport() {
        let mut driver = SimDriver::new();
        assert!(driver.send_packet(SocketPacket::connect()).await.is_err());

        driver.connect().await.unwrap();
        driver.send_packet(SocketPacket::connect()).await.unwrap();
        assert_eq!(driver.take_sent().len(), 1);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut driver = SimDriver::new();
        driver.lock().open = true;

        driver.disconnect();
        driver.disconnect();

        assert_eq!(driver.disconnects(), 1);
    }
}
