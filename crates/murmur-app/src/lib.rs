//! Application layer for Murmur
//!
//! Pure state machines and generic runtime for the chat UI, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: View controller (join screen, sidebar, feeds, composer)
//! - [`Bridge`]: Translates App actions to client operations and back
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
pub mod commands;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::Bridge;
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{Edit, KeyInput, TextInput};
pub use runtime::Runtime;
pub use state::{Focus, Session};
