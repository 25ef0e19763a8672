//! Deterministic simulation harness for Murmur.
//!
//! In-memory implementations of the Environment and Driver traits, so the
//! production [`murmur_app::Runtime`] can be stepped against a scripted
//! server without a terminal or a socket.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the view
//! rules; [`SimDriver::with_invariants`] checks them on every render.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ActiveRoomInRooms, Invariant, InvariantRegistry, InvariantResult, PeerIsNotSelf,
    RoomsUnique, TypingImpliesComposerText, UserCursorInBounds, ViewSnapshot, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError, run_until_idle};
pub use sim_env::SimEnv;
