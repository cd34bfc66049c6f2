//! Client-side state and command orchestration for the game launcher.
//!
//! All privileged work (network, filesystem, game process) lives in a
//! separate backend reached through [`backend::Backend`]. This crate keeps the
//! session state the UI renders and sequences the commands that change it.

pub mod backend;
pub mod catalog;
pub mod error;
pub mod globals;
pub mod launcher;
pub mod model;
pub mod state;
pub mod store;

pub use backend::{Backend, BackendEvent, Command};
pub use error::CommandError;
pub use state::{AppState, ClientConfig};
pub use store::Store;
