//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Network uses the WebSocket
//! transport from `murmur-client`.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use murmur_app::{App, AppEvent, Driver, KeyInput};
use murmur_client::{
    ChatState, ClientEvent, Notification,
    transport::{self, ConnectedClient, ReconnectPolicy, TransportError},
};
use murmur_proto::SocketPacket;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;

use crate::ui;

/// Interval between ticks when no input arrives.
const TICK: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal or file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No transport is open.
    #[error("not connected")]
    NotConnected,

    /// Transport task has shut down.
    #[error("channel send error")]
    ChannelSend,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the socket
/// connection. Transport events that arrive while waiting for input are
/// buffered until the runtime asks for them.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    connection: Option<ConnectedClient>,
    pending: VecDeque<ClientEvent>,
    endpoint: String,
    policy: ReconnectPolicy,
}

impl TerminalDriver {
    /// Create a new terminal driver for `endpoint`.
    pub fn new(endpoint: String, policy: ReconnectPolicy) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            connection: None,
            pending: VecDeque::new(),
            endpoint,
            policy,
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

/// Wait for the next transport event, or forever when not connected.
async fn next_transport_event(connection: &mut Option<ConnectedClient>) -> Option<ClientEvent> {
    match connection {
        Some(conn) => conn.from_server.recv().await,
        None => std::future::pending().await,
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if !self.pending.is_empty() {
            return Ok(None);
        }

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key_event.code).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Transport events, held for recv_event
            event = next_transport_event(&mut self.connection) => {
                match event {
                    Some(event) => self.pending.push_back(event),
                    None => {
                        tracing::debug!("transport task finished");
                        self.connection = None;
                    },
                }
                Ok(None)
            }

            // Tick timeout
            () = tokio::time::sleep(TICK) => Ok(Some(AppEvent::Tick)),
        }
    }

    async fn recv_event(&mut self) -> Option<ClientEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        self.connection.as_mut().and_then(|conn| conn.from_server.try_recv().ok())
    }

    async fn connect(&mut self) -> Result<(), Self::Error> {
        self.disconnect();
        tracing::info!(endpoint = %self.endpoint, "connecting");
        self.connection = Some(transport::connect(&self.endpoint, self.policy)?);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            // Outside a runtime the task is already gone with it.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(conn.shutdown());
            }
        }
        self.pending.clear();
    }

    async fn send_packet(&mut self, packet: SocketPacket) -> Result<(), Self::Error> {
        let conn = self.connection.as_ref().ok_or(TerminalError::NotConnected)?;
        conn.to_server.send(packet).await.map_err(|_| TerminalError::ChannelSend)
    }

    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>, Self::Error> {
        Ok(tokio::fs::read(path).await?)
    }

    fn notify(&mut self, notification: &Notification) {
        tracing::info!(title = %notification.title, body = %notification.body, "notification");
        let _ = stdout().execute(Print('\x07'));
    }

    fn render(&mut self, app: &App, chat: &ChatState) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app, chat);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        self.disconnect();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
