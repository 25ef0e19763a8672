//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs plus a
//! read-only view of the [`ChatState`] and produces [`crate::AppAction`]
//! instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Pre-join screen: the username field and the join action.
//! - Sidebar: the client-local room list and the roster (minus self).
//! - Main pane: the active room feed or the private conversation with the
//!   selected peer.
//! - Composer: editing, commands, the typing indicator and send rules.
//! - Private message logs, keyed by peer id.

use std::collections::HashMap;

use murmur_client::ChatState;
use murmur_proto::{ChatMessage, DEFAULT_ROOM, Id, User};

use crate::{
    AppAction, AppEvent, Focus, KeyInput, Session, TextInput,
    commands::{self, Command},
    input::Edit,
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Joined session. `None` on the join screen.
    session: Option<Session>,
    /// Username field on the join screen.
    join_input: TextInput,
    /// Client-local room list, in creation order.
    rooms: Vec<String>,
    /// Room whose feed is shown when no peer is selected.
    active_room: String,
    /// Highlighted entry in the room list.
    room_cursor: usize,
    /// Highlighted entry in the roster.
    user_cursor: usize,
    /// Peer whose private conversation is open.
    selected_peer: Option<User>,
    /// Private conversations, keyed by peer id.
    private_logs: HashMap<Id, Vec<ChatMessage>>,
    /// Room composer.
    composer: TextInput,
    /// Private conversation composer.
    private_composer: TextInput,
    /// "Create room" field.
    new_room: TextInput,
    /// Widget receiving keys.
    focus: Focus,
    /// Whether we last told the server we are typing.
    typing: bool,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an App on the join screen.
    pub fn new() -> Self {
        Self {
            session: None,
            join_input: TextInput::default(),
            rooms: vec![DEFAULT_ROOM.to_string()],
            active_room: DEFAULT_ROOM.to_string(),
            room_cursor: 0,
            user_cursor: 0,
            selected_peer: None,
            private_logs: HashMap::new(),
            composer: TextInput::default(),
            private_composer: TextInput::default(),
            new_room: TextInput::default(),
            focus: Focus::Composer,
            typing: false,
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Create an App with the username field prefilled.
    pub fn with_username(username: &str) -> Self {
        Self { join_input: TextInput::with_text(username), ..Self::new() }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent, chat: &ChatState) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::ChatUpdated => {
                if !chat.is_connected() {
                    self.typing = false;
                }
                let visible = self.visible_users(chat).len();
                self.user_cursor = self.user_cursor.min(visible.saturating_sub(1));
                vec![AppAction::Render]
            },
            AppEvent::PrivateMessageSent { to: peer, message }
            | AppEvent::PrivateMessageReceived { from: peer, message } => {
                self.private_logs.entry(peer).or_default().push(message);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
            AppEvent::Key(key) if self.session.is_none() => self.handle_join_key(key),
            AppEvent::Key(key) => self.handle_key(key, chat),
        }
    }

    /// Create the session and connect as `username`.
    ///
    /// Blank names (after trimming) are ignored.
    pub fn join(&mut self, username: &str) -> Vec<AppAction> {
        let username = username.trim();
        if username.is_empty() {
            return vec![];
        }

        self.session = Some(Session { username: username.to_string() });
        self.focus = Focus::Composer;
        self.status_message = None;
        vec![AppAction::Connect { username: username.to_string() }, AppAction::Render]
    }

    /// Disconnect and return to the join screen.
    pub fn leave(&mut self) -> Vec<AppAction> {
        self.session = None;
        self.selected_peer = None;
        self.typing = false;
        self.focus = Focus::Composer;
        self.composer.take();
        self.private_composer.take();
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Add `name` to the local room list and switch to it.
    ///
    /// Blank and duplicate names are rejected. No server traffic.
    pub fn create_room(&mut self, name: &str) -> Vec<AppAction> {
        let name = name.trim();
        if name.is_empty() {
            return vec![];
        }
        if self.rooms.iter().any(|r| r == name) {
            self.status_message = Some(format!("Room {name} already exists"));
            return vec![AppAction::Render];
        }

        self.rooms.push(name.to_string());
        self.select_room(name);
        vec![AppAction::Render]
    }

    /// Switch to `room` and close the private pane.
    pub fn select_room(&mut self, room: &str) {
        if let Some(idx) = self.rooms.iter().position(|r| r == room) {
            self.active_room = room.to_string();
            self.room_cursor = idx;
            self.selected_peer = None;
        }
    }

    /// Open the private pane for `user`.
    pub fn select_peer(&mut self, user: User) {
        self.selected_peer = Some(user);
    }

    fn handle_join_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Enter => {
                let username = self.join_input.text().to_string();
                self.join(&username)
            },
            KeyInput::Esc => vec![AppAction::Quit],
            key => match self.join_input.apply(key) {
                Edit::Ignored => vec![],
                Edit::Changed | Edit::Moved => vec![AppAction::Render],
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput, chat: &ChatState) -> Vec<AppAction> {
        match key {
            KeyInput::Tab => {
                let mut actions = Vec::new();
                if self.focus == Focus::Composer {
                    actions.extend(self.blur_composer(chat));
                }
                self.focus = self.focus.next();
                actions.push(AppAction::Render);
                actions
            },
            KeyInput::Esc if self.selected_peer.is_some() => {
                self.selected_peer = None;
                vec![AppAction::Render]
            },
            KeyInput::Esc if !chat.is_connected() => self.leave(),
            KeyInput::Esc => vec![AppAction::Quit],
            key => match self.focus {
                Focus::Composer => self.handle_composer_key(key, chat),
                Focus::Rooms => self.handle_rooms_key(key),
                Focus::Users => self.handle_users_key(key, chat),
                Focus::NewRoom => self.handle_new_room_key(key),
            },
        }
    }

    fn handle_composer_key(&mut self, key: KeyInput, chat: &ChatState) -> Vec<AppAction> {
        if !chat.is_connected() {
            return if key == KeyInput::Enter { self.submit_local() } else { vec![] };
        }
        if key == KeyInput::Enter {
            return self.submit();
        }

        match self.active_composer_mut().apply(key) {
            Edit::Ignored => vec![],
            Edit::Moved => vec![AppAction::Render],
            Edit::Changed => {
                let mut actions = self.typing_after_edit();
                actions.push(AppAction::Render);
                actions
            },
        }
    }

    /// Typing rule: start once per non-empty streak, stop on every clear.
    fn typing_after_edit(&mut self) -> Vec<AppAction> {
        if self.is_private_view() {
            return vec![];
        }
        if self.composer.is_empty() {
            self.typing = false;
            vec![AppAction::SetTyping(false)]
        } else if self.typing {
            vec![]
        } else {
            self.typing = true;
            vec![AppAction::SetTyping(true)]
        }
    }

    fn blur_composer(&mut self, chat: &ChatState) -> Vec<AppAction> {
        if self.is_private_view() || !chat.is_connected() {
            return vec![];
        }
        self.typing = false;
        vec![AppAction::SetTyping(false)]
    }

    fn submit(&mut self) -> Vec<AppAction> {
        let command = commands::parse(self.active_composer().text());
        if matches!(&command, Command::Message { content } if content.trim().is_empty()) {
            return vec![];
        }

        self.active_composer_mut().take();
        self.status_message = None;

        let mut actions = Vec::new();
        if !self.is_private_view() {
            self.typing = false;
            actions.push(AppAction::SetTyping(false));
        }
        actions.extend(self.run_command(command));
        actions
    }

    /// Submit while disconnected: only commands that need no server run.
    fn submit_local(&mut self) -> Vec<AppAction> {
        let command = commands::parse(self.active_composer().text());
        if !matches!(command, Command::Back | Command::Leave | Command::Quit) {
            return vec![];
        }

        self.active_composer_mut().take();
        self.status_message = None;
        self.run_command(command)
    }

    fn run_command(&mut self, command: Command) -> Vec<AppAction> {
        match command {
            Command::Message { content } => match &self.selected_peer {
                Some(peer) => vec![
                    AppAction::SendPrivateMessage { to: peer.id.clone(), message: content },
                    AppAction::Render,
                ],
                None => vec![
                    AppAction::SendMessage { room: self.active_room.clone(), message: content },
                    AppAction::Render,
                ],
            },
            Command::CreateRoom { room } => self.create_room(&room),
            Command::JoinRoom { room } => {
                if !self.rooms.contains(&room) {
                    self.rooms.push(room.clone());
                }
                self.select_room(&room);
                vec![AppAction::JoinRoom { room }, AppAction::Render]
            },
            Command::SendFile { path } => {
                self.status_message = Some(format!("Uploading {path}"));
                vec![AppAction::SendFile { room: self.active_room.clone(), path }, AppAction::Render]
            },
            Command::React { message_id, reaction } => {
                vec![AppAction::ReactMessage { message_id, reaction }, AppAction::Render]
            },
            Command::Read { message_id } => vec![
                AppAction::ReadMessage { message_id, room: self.active_room.clone() },
                AppAction::Render,
            ],
            Command::Back => {
                self.selected_peer = None;
                vec![AppAction::Render]
            },
            Command::Leave => self.leave(),
            Command::Quit => vec![AppAction::Quit],
            Command::Unknown { input } => {
                self.status_message = Some(format!("Unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                self.status_message = Some(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_rooms_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Up => {
                self.room_cursor = self.room_cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                self.room_cursor = (self.room_cursor + 1).min(self.rooms.len().saturating_sub(1));
                vec![AppAction::Render]
            },
            KeyInput::Enter => {
                if let Some(room) = self.rooms.get(self.room_cursor).cloned() {
                    self.select_room(&room);
                }
                vec![AppAction::Render]
            },
            _ => vec![],
        }
    }

    fn handle_users_key(&mut self, key: KeyInput, chat: &ChatState) -> Vec<AppAction> {
        let users = self.visible_users(chat);
        match key {
            KeyInput::Up => {
                self.user_cursor = self.user_cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                self.user_cursor = (self.user_cursor + 1).min(users.len().saturating_sub(1));
                vec![AppAction::Render]
            },
            KeyInput::Enter => {
                if let Some(user) = users.get(self.user_cursor) {
                    let user = (*user).clone();
                    self.select_peer(user);
                }
                vec![AppAction::Render]
            },
            _ => vec![],
        }
    }

    fn handle_new_room_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if key == KeyInput::Enter {
            let known = self.rooms.len();
            let name = self.new_room.text().to_string();
            let actions = self.create_room(&name);
            if self.rooms.len() > known {
                self.new_room.take();
            }
            return actions;
        }

        match self.new_room.apply(key) {
            Edit::Ignored => vec![],
            Edit::Changed | Edit::Moved => vec![AppAction::Render],
        }
    }

    fn active_composer(&self) -> &TextInput {
        if self.is_private_view() { &self.private_composer } else { &self.composer }
    }

    fn active_composer_mut(&mut self) -> &mut TextInput {
        if self.is_private_view() { &mut self.private_composer } else { &mut self.composer }
    }

    /// Roster as shown in the sidebar: everyone except ourselves.
    pub fn visible_users<'a>(&'a self, chat: &'a ChatState) -> Vec<&'a User> {
        chat.others(self.username().unwrap_or_default()).collect()
    }

    /// Room feed for the active room.
    pub fn room_feed<'a>(&'a self, chat: &'a ChatState) -> impl Iterator<Item = &'a ChatMessage> {
        chat.room_feed(&self.active_room)
    }

    /// Joined session. `None` on the join screen.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Username of the joined session.
    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    /// Client-local room list.
    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// Active room name.
    pub fn active_room(&self) -> &str {
        &self.active_room
    }

    /// Highlighted room list entry.
    pub fn room_cursor(&self) -> usize {
        self.room_cursor
    }

    /// Highlighted roster entry.
    pub fn user_cursor(&self) -> usize {
        self.user_cursor
    }

    /// Peer whose private pane is open.
    pub fn selected_peer(&self) -> Option<&User> {
        self.selected_peer.as_ref()
    }

    /// True when the private pane is open.
    pub fn is_private_view(&self) -> bool {
        self.selected_peer.is_some()
    }

    /// Private conversation with `peer`, in append order.
    pub fn private_log(&self, peer: &Id) -> &[ChatMessage] {
        self.private_logs.get(peer).map_or(&[], Vec::as_slice)
    }

    /// All private conversations.
    pub fn private_logs(&self) -> &HashMap<Id, Vec<ChatMessage>> {
        &self.private_logs
    }

    /// Room composer.
    pub fn composer(&self) -> &TextInput {
        &self.composer
    }

    /// Private conversation composer.
    pub fn private_composer(&self) -> &TextInput {
        &self.private_composer
    }

    /// "Create room" field.
    pub fn new_room_input(&self) -> &TextInput {
        &self.new_room
    }

    /// Username field on the join screen.
    pub fn join_input(&self) -> &TextInput {
        &self.join_input
    }

    /// Widget receiving keys.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Whether we last told the server we are typing.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use murmur_client::ConnectionStatus;

    use super::*;

    fn connected() -> ChatState {
        ChatState {
            status: ConnectionStatus::Connected,
            users: vec![User::new("a1", "alice"), User::new("b2", "bob")],
            ..ChatState::default()
        }
    }

    fn joined_app() -> App {
        let mut app = App::new();
        let _ = app.join("alice");
        app
    }

    fn type_text(app: &mut App, chat: &ChatState, text: &str) -> Vec<AppAction> {
        text.chars().flat_map(|c| app.handle(AppEvent::Key(KeyInput::Char(c)), chat)).collect()
    }

    fn key(app: &mut App, chat: &ChatState, key: KeyInput) -> Vec<AppAction> {
        app.handle(AppEvent::Key(key), chat)
    }

    #[test]
    fn join_trims_username() {
        let mut app = App::new();
        let actions = app.join("  alice ");

        assert_eq!(actions, [AppAction::Connect { username: "alice".into() }, AppAction::Render]);
        assert_eq!(app.username(), Some("alice"));
    }

    #[test]
    fn blank_username_does_not_join() {
        let mut app = App::with_username("   ");
        let actions = key(&mut app, &ChatState::default(), KeyInput::Enter);

        assert!(actions.is_empty());
        assert!(app.session().is_none());
    }

    #[test]
    fn esc_on_join_screen_quits() {
        let mut app = App::new();
        assert_eq!(key(&mut app, &ChatState::default(), KeyInput::Esc), [AppAction::Quit]);
    }

    #[test]
    fn typing_starts_once_and_stops_on_clear() {
        let chat = connected();
        let mut app = joined_app();

        let actions = type_text(&mut app, &chat, "hey");
        let typing: Vec<_> =
            actions.iter().filter(|a| matches!(a, AppAction::SetTyping(_))).collect();
        assert_eq!(typing, [&AppAction::SetTyping(true)]);

        for _ in 0..3 {
            key(&mut app, &chat, KeyInput::Backspace);
        }
        assert!(!app.is_typing());

        let actions = key(&mut app, &chat, KeyInput::Backspace);
        assert!(!actions.contains(&AppAction::SetTyping(true)));
    }

    #[test]
    fn clearing_always_sends_typing_stop() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "a");
        let actions = key(&mut app, &chat, KeyInput::Backspace);
        assert!(actions.contains(&AppAction::SetTyping(false)));
    }

    #[test]
    fn send_clears_composer_and_typing() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "  hello  ");
        let actions = key(&mut app, &chat, KeyInput::Enter);

        assert_eq!(actions, [
            AppAction::SetTyping(false),
            AppAction::SendMessage { room: "global".into(), message: "  hello  ".into() },
            AppAction::Render,
        ]);
        assert!(app.composer().is_empty());
        assert!(!app.is_typing());
    }

    #[test]
    fn blank_message_is_not_sent() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "   ");
        let actions = key(&mut app, &chat, KeyInput::Enter);
        assert!(actions.is_empty());
    }

    #[test]
    fn composer_is_disabled_while_disconnected() {
        let chat = ChatState::default();
        let mut app = joined_app();

        assert!(type_text(&mut app, &chat, "hi").is_empty());
        assert!(key(&mut app, &chat, KeyInput::Enter).is_empty());
        assert!(app.composer().is_empty());
    }

    #[test]
    fn esc_leaves_while_disconnected() {
        let mut app = joined_app();

        let actions = key(&mut app, &ChatState::default(), KeyInput::Esc);
        assert_eq!(actions, [AppAction::Disconnect, AppAction::Render]);
        assert!(app.session().is_none());
    }

    #[test]
    fn typed_leave_still_works_after_connection_loss() {
        let mut app = joined_app();
        type_text(&mut app, &connected(), "/leave");

        let actions = key(&mut app, &ChatState::default(), KeyInput::Enter);
        assert!(actions.contains(&AppAction::Disconnect));
        assert!(app.session().is_none());
    }

    #[test]
    fn typed_message_is_held_while_disconnected() {
        let mut app = joined_app();
        type_text(&mut app, &connected(), "later");

        assert!(key(&mut app, &ChatState::default(), KeyInput::Enter).is_empty());
        assert_eq!(app.composer().text(), "later");
    }

    #[test]
    fn slash_escape_sends_literal_text() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "//shrug");
        let actions = key(&mut app, &chat, KeyInput::Enter);
        assert!(actions.contains(&AppAction::SendMessage {
            room: "global".into(),
            message: "/shrug".into()
        }));
    }

    #[test]
    fn leaving_composer_stops_typing() {
        let chat = connected();
        let mut app = joined_app();

        let actions = key(&mut app, &chat, KeyInput::Tab);
        assert_eq!(actions, [AppAction::SetTyping(false), AppAction::Render]);
        assert_eq!(app.focus(), Focus::Rooms);
    }

    #[test]
    fn selecting_user_opens_private_pane() {
        let chat = connected();
        let mut app = joined_app();

        key(&mut app, &chat, KeyInput::Tab);
        key(&mut app, &chat, KeyInput::Tab);
        assert_eq!(app.focus(), Focus::Users);
        assert_eq!(app.visible_users(&chat).len(), 1);

        key(&mut app, &chat, KeyInput::Enter);
        assert_eq!(app.selected_peer().map(|u| u.username.as_str()), Some("bob"));

        key(&mut app, &chat, KeyInput::Esc);
        assert!(app.selected_peer().is_none());
    }

    #[test]
    fn private_send_targets_peer_without_typing() {
        let chat = connected();
        let mut app = joined_app();
        app.select_peer(User::new("b2", "bob"));

        let actions = type_text(&mut app, &chat, "hi");
        assert!(!actions.iter().any(|a| matches!(a, AppAction::SetTyping(_))));

        let actions = key(&mut app, &chat, KeyInput::Enter);
        assert_eq!(actions, [
            AppAction::SendPrivateMessage { to: Id::from("b2"), message: "hi".into() },
            AppAction::Render,
        ]);
    }

    #[test]
    fn create_room_rejects_duplicates() {
        let mut app = joined_app();
        let _ = app.create_room("design");
        let _ = app.create_room(" design ");

        assert_eq!(app.rooms(), ["global", "design"]);
        assert!(app.status_message().is_some());
    }

    #[test]
    fn selecting_room_clears_peer() {
        let mut app = joined_app();
        let _ = app.create_room("design");
        app.select_peer(User::new("b2", "bob"));

        app.select_room("global");
        assert_eq!(app.active_room(), "global");
        assert!(app.selected_peer().is_none());
    }

    #[test]
    fn join_command_switches_locally_and_asks_server() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "/join random");
        let actions = key(&mut app, &chat, KeyInput::Enter);

        assert!(actions.contains(&AppAction::JoinRoom { room: "random".into() }));
        assert_eq!(app.active_room(), "random");
    }

    #[test]
    fn leave_command_returns_to_join_screen() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "/leave");
        let actions = key(&mut app, &chat, KeyInput::Enter);

        assert!(actions.contains(&AppAction::Disconnect));
        assert!(app.session().is_none());
    }

    #[test]
    fn unknown_command_sets_status() {
        let chat = connected();
        let mut app = joined_app();

        type_text(&mut app, &chat, "/bogus");
        key(&mut app, &chat, KeyInput::Enter);
        assert_eq!(app.status_message(), Some("Unknown command: /bogus"));
    }

    #[test]
    fn disconnect_resets_typing() {
        let chat = connected();
        let mut app = joined_app();
        type_text(&mut app, &chat, "a");
        assert!(app.is_typing());

        app.handle(AppEvent::ChatUpdated, &ChatState::default());
        assert!(!app.is_typing());
    }
}
