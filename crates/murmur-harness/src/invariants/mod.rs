//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during execution. Unlike
//! example-based tests that check specific scenarios, invariants verify
//! behavioral properties across all possible execution paths.
//!
//! # Architecture
//!
//! The invariant system extracts observable state from the App and the chat
//! state into a [`ViewSnapshot`], then runs registered [`Invariant`] checks
//! against it.

mod checks;
mod snapshot;

pub use checks::{
    ActiveRoomInRooms, PeerIsNotSelf, RoomsUnique, TypingImpliesComposerText, UserCursorInBounds,
};
pub use snapshot::ViewSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against view state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against the current state.
    fn check(&self, state: &ViewSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard view invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(ActiveRoomInRooms);
        registry.add(RoomsUnique);
        registry.add(TypingImpliesComposerText);
        registry.add(UserCursorInBounds);
        registry.add(PeerIsNotSelf);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &ViewSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn join_screen_passes_invariants() {
        let snapshot = ViewSnapshot {
            rooms: vec!["global".to_string()],
            active_room: "global".to_string(),
            ..ViewSnapshot::default()
        };
        assert!(InvariantRegistry::standard().check_all(&snapshot).is_ok());
    }

    #[test]
    fn all_violations_are_reported() {
        let snapshot = ViewSnapshot {
            active_room: "nowhere".to_string(),
            typing: true,
            ..ViewSnapshot::default()
        };
        let violations = InvariantRegistry::standard().check_all(&snapshot).unwrap_err();
        assert_eq!(violations.len(), 2);
    }
}
