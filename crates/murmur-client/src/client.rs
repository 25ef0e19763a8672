//! Connection and event bridge state machine.
//!
//! [`Client`] owns the observable [`ChatState`] and translates in both
//! directions: outbound operations become Socket.IO packets wrapped in
//! [`ClientAction::Send`], and inbound packets become state updates.
//!
//! # Policy
//!
//! - Outbound operations are fire-and-forget: no acks, no retries, no payload
//!   validation beyond what the caller already did.
//! - Roster and typing set are replaced wholesale on every update.
//! - Reaction and read patches touch only messages whose id matches.
//! - No deduplication and no reordering; transport order is receipt order.

use murmur_proto::{
    ChatMessage, FileUpload, Id, InboundEvent, OutboundEvent, PacketKind, PrivateMessage,
    ReadReceipt, Reaction, SendMessage, SocketPacket, User,
};
use serde_json::Value;

use crate::{
    ChatState, ClientAction, ClientError, ClientEvent, ConnectionStatus, Environment,
    Notification,
};

/// Title used for every notification.
pub const NOTIFICATION_TITLE: &str = "New message";

/// Body used when a notification carries no message text.
pub const NOTIFICATION_FALLBACK: &str = "You have a new message!";

/// Connection and event bridge.
///
/// Sans-IO: methods return [`ClientAction`]s and never touch the network.
#[derive(Debug, Clone)]
pub struct Client<E: Environment> {
    env: E,
    state: ChatState,
}

impl<E: Environment> Client<E> {
    /// Create a disconnected client.
    pub fn new(env: E) -> Self {
        Self { env, state: ChatState::default() }
    }

    /// Observable state.
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Environment used for timestamps.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Username announced on the last connect.
    pub fn username(&self) -> Option<&str> {
        self.state.username.as_deref()
    }

    /// Open the connection and announce `username`.
    ///
    /// The announcement is queued right behind the connect; the transport
    /// holds it until the namespace is connected.
    pub fn connect(&mut self, username: &str) -> Result<Vec<ClientAction>, ClientError> {
        self.state.status = ConnectionStatus::Connecting;
        let mut actions = vec![ClientAction::Connect];

        if !username.is_empty() {
            self.state.username = Some(username.to_string());
            actions.extend(self.emit(OutboundEvent::UserJoin { username: username.to_string() })?);
        }

        tracing::debug!(%username, "connect requested");
        Ok(actions)
    }

    /// Close the connection. Safe to call repeatedly.
    pub fn disconnect(&mut self) -> Vec<ClientAction> {
        self.state.status = ConnectionStatus::Disconnected;
        vec![ClientAction::Disconnect]
    }

    /// Post a message to a room.
    pub fn send_message(&mut self, payload: SendMessage) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::SendMessage(payload))
    }

    /// Send a direct message to user `to`.
    pub fn send_private_message(
        &mut self,
        to: Id,
        message: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::PrivateMessage(PrivateMessage { to, message }))
    }

    /// Upload a file (already encoded as a data URL) to a room.
    pub fn send_file(
        &mut self,
        room: String,
        file: String,
        filename: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::SendFile(FileUpload { room, file, filename }))
    }

    /// React to a message.
    pub fn react_message(
        &mut self,
        message_id: Id,
        reaction: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::ReactMessage(Reaction { message_id, reaction }))
    }

    /// Mark a message as read.
    pub fn read_message(
        &mut self,
        message_id: Id,
        room: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::ReadMessage(ReadReceipt { message_id, room }))
    }

    /// Turn the typing indicator on or off.
    pub fn set_typing(&mut self, typing: bool) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::Typing(typing))
    }

    /// Ask the server to join a room.
    pub fn join_room(&mut self, room: String) -> Result<Vec<ClientAction>, ClientError> {
        self.emit(OutboundEvent::JoinRoom { room })
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connected => {
                self.state.status = ConnectionStatus::Connected;
                Ok(vec![])
            },
            ClientEvent::Disconnected { reason } => {
                tracing::info!(%reason, "disconnected");
                self.state.status = ConnectionStatus::Disconnected;
                Ok(vec![])
            },
            ClientEvent::PacketReceived(packet) => self.handle_packet(&packet),
        }
    }

    fn handle_packet(&mut self, packet: &SocketPacket) -> Result<Vec<ClientAction>, ClientError> {
        match packet.kind {
            PacketKind::Connect => {
                self.state.status = ConnectionStatus::Connected;
                Ok(vec![])
            },
            PacketKind::Disconnect => {
                self.state.status = ConnectionStatus::Disconnected;
                Ok(vec![])
            },
            PacketKind::ConnectError => {
                let reason = packet.data.as_ref().map_or_else(String::new, Value::to_string);
                Err(ClientError::ConnectRefused(reason))
            },
            PacketKind::Event => {
                let event = InboundEvent::from_packet(packet)?;
                Ok(self.apply(event))
            },
            PacketKind::Ack | PacketKind::BinaryEvent | PacketKind::BinaryAck => {
                tracing::trace!(kind = ?packet.kind, "ignoring packet");
                Ok(vec![])
            },
        }
    }

    fn apply(&mut self, event: InboundEvent) -> Vec<ClientAction> {
        tracing::trace!(event = event.name(), "inbound event");

        match event {
            InboundEvent::ReceiveMessage(message) => {
                self.append(message);
            },
            InboundEvent::PrivateMessage(mut message) => {
                message.is_private = true;
                self.append(message);
            },
            InboundEvent::UserList(users) => {
                self.state.users = users;
            },
            InboundEvent::UserJoined(user) => {
                let notice = self.system_message(&user, "joined");
                self.state.messages.push(notice);
            },
            InboundEvent::UserLeft(user) => {
                let notice = self.system_message(&user, "left");
                self.state.messages.push(notice);
            },
            InboundEvent::TypingUsers(users) => {
                self.state.typing_users = users;
            },
            InboundEvent::RoomList(rooms) => {
                self.state.announced_rooms = rooms;
            },
            InboundEvent::RoomJoined(room) => {
                self.state.last_joined_room = Some(room);
            },
            InboundEvent::MessageReacted(update) => {
                self.patch(&update.message_id, |m| m.reactions = Some(update.reactions.clone()));
            },
            InboundEvent::MessageRead(update) => {
                self.patch(&update.message_id, |m| m.read_by = Some(update.read_by.clone()));
            },
            InboundEvent::UnreadCount(count) => {
                self.state.unread_count = Some(count);
            },
            InboundEvent::Notify(data) => {
                return vec![ClientAction::Notify(notification_from(&data))];
            },
        }
        vec![]
    }

    fn append(&mut self, message: ChatMessage) {
        self.state.last_message = Some(message.clone());
        self.state.messages.push(message);
    }

    fn patch(&mut self, id: &Id, mut update: impl FnMut(&mut ChatMessage)) {
        self.state.messages.iter_mut().filter(|m| m.id.as_ref() == Some(id)).for_each(&mut update);
    }

    fn system_message(&self, user: &User, verb: &str) -> ChatMessage {
        ChatMessage {
            id: Some(Id::Int(self.env.now_millis())),
            message: format!("{} {verb} the chat", user.display_name()),
            timestamp: Some(self.env.timestamp()),
            system: true,
            ..ChatMessage::default()
        }
    }

    fn emit(&self, event: OutboundEvent) -> Result<Vec<ClientAction>, ClientError> {
        tracing::trace!(event = event.name(), "outbound event");
        Ok(vec![ClientAction::Send(event.into_packet()?)])
    }
}

/// Build a notification from a `notify` payload.
///
/// Uses `data.message.message` when present.
fn notification_from(data: &Value) -> Notification {
    let body = data
        .get("message")
        .and_then(|m| m.get("message"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOTIFICATION_FALLBACK);

    Notification { title: NOTIFICATION_TITLE.to_string(), body: body.to_string() }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[derive(Clone)]
    struct TestEnv;

    impl Environment for TestEnv {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        }
    }

    fn event(name: &str, payload: Value) -> ClientEvent {
        ClientEvent::PacketReceived(SocketPacket::event(name, payload))
    }

    #[test]
    fn connect_announces_username() {
        let mut client = Client::new(TestEnv);
        let actions = client.connect("alice").unwrap();

        assert_eq!(actions[0], ClientAction::Connect);
        assert_eq!(
            actions[1],
            ClientAction::Send(SocketPacket::event("user_join", json!("alice")))
        );
        assert_eq!(client.state().status, ConnectionStatus::Connecting);
        assert_eq!(client.username(), Some("alice"));
    }

    #[test]
    fn connect_without_username_only_connects() {
        let mut client = Client::new(TestEnv);
        assert_eq!(client.connect("").unwrap(), vec![ClientAction::Connect]);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut client = Client::new(TestEnv);
        assert_eq!(client.disconnect(), vec![ClientAction::Disconnect]);
        assert_eq!(client.disconnect(), vec![ClientAction::Disconnect]);
        assert!(!client.state().is_connected());
    }

    #[test]
    fn lifecycle_events_drive_status() {
        let mut client = Client::new(TestEnv);
        client.handle(ClientEvent::Connected).unwrap();
        assert!(client.state().is_connected());

        client.handle(ClientEvent::Disconnected { reason: "io error".into() }).unwrap();
        assert_eq!(client.state().status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn user_joined_synthesizes_system_message() {
        let mut client = Client::new(TestEnv);
        client.handle(event("user_joined", json!({"id": "b", "username": "bob"}))).unwrap();

        let notice = &client.state().messages[0];
        assert!(notice.system);
        assert_eq!(notice.message, "bob joined the chat");
        assert_eq!(notice.id, Some(Id::Int(1_714_557_600_000)));
        assert_eq!(notice.timestamp.as_deref(), Some("2024-05-01T10:00:00.000Z"));
    }

    #[test]
    fn user_list_replaces_roster() {
        let mut client = Client::new(TestEnv);
        client.handle(event("user_list", json!([{"id": "a", "username": "alice"}]))).unwrap();
        client.handle(event("user_list", json!([{"id": "b", "username": "bob"}]))).unwrap();

        assert_eq!(client.state().users, vec![User::new("b", "bob")]);
    }

    #[test]
    fn read_receipt_patches_matching_message_only() {
        let mut client = Client::new(TestEnv);
        client.handle(event("receive_message", json!({"id": 1, "message": "one"}))).unwrap();
        client.handle(event("receive_message", json!({"id": 2, "message": "two"}))).unwrap();
        client
            .handle(event("message_read", json!({"messageId": 2, "readBy": ["alice"]})))
            .unwrap();

        assert_eq!(client.state().messages[0].read_by, None);
        assert_eq!(client.state().messages[1].read_by, Some(json!(["alice"])));
    }

    #[test]
    fn private_messages_are_flagged() {
        let mut client = Client::new(TestEnv);
        client
            .handle(event("private_message", json!({"sender": "bob", "message": "psst"})))
            .unwrap();

        assert!(client.state().messages[0].is_private);
        assert_eq!(client.state().last_message.as_ref().map(|m| m.is_private), Some(true));
    }

    #[test]
    fn notify_uses_message_text_or_fallback() {
        let mut client = Client::new(TestEnv);
        let actions =
            client.handle(event("notify", json!({"message": {"message": "hello"}}))).unwrap();
        assert_eq!(
            actions,
            vec![ClientAction::Notify(Notification {
                title: "New message".into(),
                body: "hello".into()
            })]
        );

        let actions = client.handle(event("notify", json!({}))).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [ClientAction::Notify(n)] if n.body == "You have a new message!"
        ));
    }

    #[test]
    fn room_events_are_recorded_not_merged() {
        let mut client = Client::new(TestEnv);
        client.handle(event("room_list", json!(["global", "random"]))).unwrap();
        client.handle(event("room_joined", json!("random"))).unwrap();

        assert_eq!(client.state().announced_rooms, ["global", "random"]);
        assert_eq!(client.state().last_joined_room.as_deref(), Some("random"));
    }

    #[test]
    fn unknown_event_is_an_error() {
        let mut client = Client::new(TestEnv);
        let result = client.handle(event("mystery", json!(null)));
        assert!(matches!(result, Err(ClientError::Protocol(_))));
        assert!(client.state().messages.is_empty());
    }

    #[test]
    fn connect_error_is_reported() {
        let mut client = Client::new(TestEnv);
        let packet = SocketPacket::decode(r#"4{"message":"Not authorized"}"#).unwrap();
        let result = client.handle(ClientEvent::PacketReceived(packet));
        assert!(matches!(result, Err(ClientError::ConnectRefused(_))));
    }
}
