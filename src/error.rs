//! Error type shared by every store operation.

/// Failure of a backend command or of the store action wrapping it.
///
/// The backend signals failure with a plain string; the empty string is
/// reserved for "cancelled, do not report" and maps to [`CommandError::Cancelled`].
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The user interrupted the action or a newer request superseded it.
    /// Never logged and never shown.
    #[error("cancelled")]
    Cancelled,

    /// Error text reported by the backend, shown verbatim.
    #[error("{0}")]
    Backend(String),

    /// The backend answered with a payload of the wrong shape.
    #[error("unexpected response to {command}: {source}")]
    Decode {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint list changed while its edit dialog was open.
    #[error("the server list changed while it was being edited")]
    StaleEdit,

    /// A dialog confirm action was dispatched with no dialog open.
    #[error("no dialog is open")]
    NoDialog,
}

impl CommandError {
    /// Maps the backend's raw error string.
    pub fn from_backend(message: String) -> Self {
        if message.is_empty() {
            CommandError::Cancelled
        } else {
            CommandError::Backend(message)
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled)
    }
}
