pub mod character;
pub mod content;
pub mod endpoint;
pub mod log;
pub mod patcher;
pub mod session;

pub use character::{AuthResult, Character, CharacterId};
pub use content::{Banner, EndpointContent, Link, MessagesPayload, NewsKind, NewsMessage};
pub use endpoint::{Endpoint, EndpointsPayload};
pub use log::{LogEntry, LogLevel};
pub use patcher::{PatchState, PatchStatus};
pub use session::{InitialData, Page, Style};
