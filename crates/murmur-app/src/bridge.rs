//! Client-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`murmur_client::Client`] and adapts it to the
//! application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`]s into client operations.
//! - Accumulates outgoing [`ClientAction`]s (packets, connection changes,
//!   notifications) for the driver to execute in the next I/O cycle.
//! - Interprets client results and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Builds the optimistic copy of every sent private message.
//!
//! Client errors are logged and dropped; they never reach the UI.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use murmur_client::{ChatState, Client, ClientAction, ClientError, ClientEvent, Environment};
use murmur_proto::{ChatMessage, SendMessage};

use crate::{AppAction, AppEvent};

/// MIME type used for uploaded files.
const UPLOAD_MIME: &str = "application/octet-stream";

/// Bridge between App and Client.
///
/// Generic over Environment to support both production and simulation.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<ClientAction>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment.
    pub fn new(env: E) -> Self {
        Self { client: Client::new(env), outgoing: Vec::new() }
    }

    /// Observable chat state.
    pub fn state(&self) -> &ChatState {
        self.client.state()
    }

    /// Underlying client.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::Connect { username } => {
                let result = self.client.connect(&username);
                self.handle_client_result(result)
            },
            AppAction::Disconnect => {
                let actions = self.client.disconnect();
                self.outgoing.extend(actions);
                vec![AppEvent::ChatUpdated]
            },
            AppAction::SendMessage { room, message } => {
                let result = self.client.send_message(SendMessage::new(message, room));
                self.handle_client_result(result)
            },
            AppAction::SendPrivateMessage { to, message } => {
                let result = self.client.send_private_message(to.clone(), message.clone());
                let mut events = self.handle_client_result(result);

                // Shown at once; the server echo (if any) is not reconciled.
                let copy = ChatMessage {
                    sender: self.client.username().map(ToString::to_string),
                    message,
                    timestamp: Some(self.client.env().timestamp()),
                    is_private: true,
                    ..ChatMessage::default()
                };
                events.push(AppEvent::PrivateMessageSent { to, message: copy });
                events
            },
            AppAction::SetTyping(typing) => {
                let result = self.client.set_typing(typing);
                self.handle_client_result(result)
            },
            AppAction::JoinRoom { room } => {
                let result = self.client.join_room(room);
                self.handle_client_result(result)
            },
            AppAction::ReactMessage { message_id, reaction } => {
                let result = self.client.react_message(message_id, reaction);
                self.handle_client_result(result)
            },
            AppAction::ReadMessage { message_id, room } => {
                let result = self.client.read_message(message_id, room);
                self.handle_client_result(result)
            },
            // File contents come from the driver; see `send_file`.
            AppAction::SendFile { .. } | AppAction::Render | AppAction::Quit => vec![],
        }
    }

    /// Upload `contents` (read from `path`) to `room` as a base64 data URL.
    pub fn send_file(&mut self, room: &str, path: &str, contents: &[u8]) -> Vec<AppEvent> {
        let filename = Path::new(path)
            .file_name()
            .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned());
        let file = format!("data:{UPLOAD_MIME};base64,{}", STANDARD.encode(contents));

        tracing::debug!(%room, %filename, bytes = contents.len(), "uploading file");
        let result = self.client.send_file(room.to_string(), file, filename);
        self.handle_client_result(result)
    }

    /// Handle an event from the transport.
    pub fn handle_client_event(&mut self, event: ClientEvent) -> Vec<AppEvent> {
        let known = self.client.state().messages.len();
        let result = self.client.handle(event);
        let mut events = self.handle_client_result(result);

        for message in &self.client.state().messages[known..] {
            if message.has_private_peer()
                && let Some(from) = &message.sender_id
            {
                events.push(AppEvent::PrivateMessageReceived {
                    from: from.clone(),
                    message: message.clone(),
                });
            }
        }

        events.push(AppEvent::ChatUpdated);
        events
    }

    /// Take pending outgoing client actions.
    pub fn take_outgoing(&mut self) -> Vec<ClientAction> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => {
                self.outgoing.extend(actions);
                vec![]
            },
            Err(e) => {
                tracing::warn!(error = %e, "client error, dropping");
                vec![]
            },
        }
    }
}
