use serde::Serialize;

use crate::model::{Character, Endpoint};

/// Staging payload of the server add/edit dialog.
///
/// `original` is the endpoint found at `index` when the dialog opened, or
/// `None` when adding. Save and remove refuse to run if the list no longer
/// holds it at that position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointDraft {
    pub index: usize,
    pub remote: bool,
    pub endpoint: Endpoint,
    pub original: Option<Endpoint>,
}

impl EndpointDraft {
    pub fn is_new(&self) -> bool {
        self.original.is_none()
    }
}

/// Which modal is open, together with what it is acting on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DialogKind {
    DeleteCharacter(Character),
    Server(EndpointDraft),
    Patch,
}

/// The single modal slot.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct DialogState {
    pub open: bool,
    pub kind: Option<DialogKind>,
    pub loading: bool,
    pub error: String,
}

impl DialogState {
    pub fn is_open(&self, matches: impl FnOnce(&DialogKind) -> bool) -> bool {
        self.open && self.kind.as_ref().is_some_and(matches)
    }
}
