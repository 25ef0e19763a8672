//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use super::{Invariant, InvariantResult, ViewSnapshot, Violation};

/// Active room must be in the room list.
///
/// Prevents the UI from showing a feed for a room the sidebar doesn't list.
pub struct ActiveRoomInRooms;

impl Invariant for ActiveRoomInRooms {
    fn name(&self) -> &'static str {
        "ActiveRoomInRooms"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        if state.rooms.contains(&state.active_room) {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!("active room {} not in {:?}", state.active_room, state.rooms),
        })
    }
}

/// Room names are unique.
pub struct RoomsUnique;

impl Invariant for RoomsUnique {
    fn name(&self) -> &'static str {
        "RoomsUnique"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        let mut seen = HashSet::new();
        for room in &state.rooms {
            if !seen.insert(room) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("room {room} listed twice in {:?}", state.rooms),
                });
            }
        }
        Ok(())
    }
}

/// A typing signal is only outstanding while the room composer has text.
///
/// Otherwise peers would see a typing indicator that never clears.
pub struct TypingImpliesComposerText;

impl Invariant for TypingImpliesComposerText {
    fn name(&self) -> &'static str {
        "TypingImpliesComposerText"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        if state.typing && state.composer_text.is_empty() {
            return Err(Violation {
                invariant: self.name(),
                message: "typing flagged with an empty composer".to_string(),
            });
        }
        if state.typing && !state.connected {
            return Err(Violation {
                invariant: self.name(),
                message: "typing flagged while disconnected".to_string(),
            });
        }
        Ok(())
    }
}

/// Roster cursor stays within the visible roster.
pub struct UserCursorInBounds;

impl Invariant for UserCursorInBounds {
    fn name(&self) -> &'static str {
        "UserCursorInBounds"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        let max = state.visible_users.len().saturating_sub(1);
        if state.user_cursor <= max {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!(
                "cursor {} past roster of {}",
                state.user_cursor,
                state.visible_users.len()
            ),
        })
    }
}

/// Neither the roster nor the private pane ever shows ourselves.
pub struct PeerIsNotSelf;

impl Invariant for PeerIsNotSelf {
    fn name(&self) -> &'static str {
        "PeerIsNotSelf"
    }

    fn check(&self, state: &ViewSnapshot) -> InvariantResult {
        let Some(me) = state.username.as_deref() else {
            return Ok(());
        };
        if state.visible_users.iter().any(|u| u.username == me) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{me} listed in own roster"),
            });
        }
        if state.selected_peer.as_ref().is_some_and(|p| p.username == me) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{me} selected as private peer"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use murmur_proto::User;

    use super::*;

    fn snapshot() -> ViewSnapshot {
        ViewSnapshot {
            username: Some("alice".to_string()),
            rooms: vec!["global".to_string()],
            active_room: "global".to_string(),
            connected: true,
            ..ViewSnapshot::default()
        }
    }

    #[test]
    fn active_room_outside_list_fails() {
        let state = ViewSnapshot { active_room: "design".to_string(), ..snapshot() };
        assert!(ActiveRoomInRooms.check(&state).is_err());
        assert!(ActiveRoomInRooms.check(&snapshot()).is_ok());
    }

    #[test]
    fn duplicate_room_fails() {
        let state =
            ViewSnapshot { rooms: vec!["global".to_string(), "global".to_string()], ..snapshot() };
        assert!(RoomsUnique.check(&state).is_err());
    }

    #[test]
    fn typing_without_text_fails() {
        let state = ViewSnapshot { typing: true, ..snapshot() };
        assert!(TypingImpliesComposerText.check(&state).is_err());

        let state = ViewSnapshot { typing: true, composer_text: "h".to_string(), ..snapshot() };
        assert!(TypingImpliesComposerText.check(&state).is_ok());
    }

    #[test]
    fn cursor_on_empty_roster_is_zero() {
        assert!(UserCursorInBounds.check(&snapshot()).is_ok());

        let state = ViewSnapshot { user_cursor: 1, ..snapshot() };
        assert!(UserCursorInBounds.check(&state).is_err());
    }

    #[test]
    fn selecting_self_fails() {
        let state = ViewSnapshot { selected_peer: Some(User::new(1_i64, "alice")), ..snapshot() };
        assert!(PeerIsNotSelf.check(&state).is_err());
    }
}
