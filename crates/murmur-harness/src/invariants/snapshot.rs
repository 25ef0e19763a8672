//! Observable view state for invariant checking.
//!
//! Snapshots capture what the user can see at a point in time. Invariants
//! operate on snapshots rather than live state to ensure consistent, atomic
//! checks.

use murmur_app::App;
use murmur_client::ChatState;
use murmur_proto::User;

/// Snapshot of one client's App and chat state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    /// Signed-in username, `None` on the join screen.
    pub username: Option<String>,
    /// Local room list, in sidebar order.
    pub rooms: Vec<String>,
    /// Room whose feed is shown when no peer is selected.
    pub active_room: String,
    /// Peer of the open private pane.
    pub selected_peer: Option<User>,
    /// Roster as shown in the sidebar.
    pub visible_users: Vec<User>,
    /// Highlighted roster entry.
    pub user_cursor: usize,
    /// Room composer text.
    pub composer_text: String,
    /// Whether a typing-start signal is outstanding.
    pub typing: bool,
    /// Whether the namespace is connected.
    pub connected: bool,
}

impl ViewSnapshot {
    /// Capture the observable state of `app` over `chat`.
    pub fn capture(app: &App, chat: &ChatState) -> Self {
        Self {
            username: app.username().map(str::to_string),
            rooms: app.rooms().to_vec(),
            active_room: app.active_room().to_string(),
            selected_peer: app.selected_peer().cloned(),
            visible_users: app.visible_users(chat).into_iter().cloned().collect(),
            user_cursor: app.user_cursor(),
            composer_text: app.composer().text().to_string(),
            typing: app.is_typing(),
            connected: chat.is_connected(),
        }
    }
}
