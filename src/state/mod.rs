pub mod dialog;
pub mod persistent;
#[allow(clippy::module_inception)]
pub mod state;

pub use dialog::{DialogKind, DialogState, EndpointDraft};
pub use persistent::{BackendConfig, ClientConfig};
pub use state::AppState;
