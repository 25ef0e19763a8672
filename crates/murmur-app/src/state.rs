//! View state types.
//!
//! These structures describe what the user is looking at. Chat data itself
//! (messages, roster, typing set) lives in [`murmur_client::ChatState`].

/// Joined session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Trimmed username announced on connect.
    pub username: String,
}

/// Which widget receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Message composer.
    #[default]
    Composer,
    /// Room list in the sidebar.
    Rooms,
    /// Online roster in the sidebar.
    Users,
    /// "Create room" field.
    NewRoom,
}

impl Focus {
    /// Next widget in the Tab cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Composer => Self::Rooms,
            Self::Rooms => Self::Users,
            Self::Users => Self::NewRoom,
            Self::NewRoom => Self::Composer,
        }
    }
}
