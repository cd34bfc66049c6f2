use serde::{Deserialize, Serialize};

/// Phase of a patch run. `Done` and `Error` end a run; the next run starts
/// over at `Checking`.
///
/// The backend emits the integer discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PatchState {
    #[default]
    Checking,
    Downloading,
    Patching,
    Done,
    Error,
}

impl PatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PatchState::Done | PatchState::Error)
    }

    fn from_discriminant(value: u8) -> Option<PatchState> {
        match value {
            0 => Some(PatchState::Checking),
            1 => Some(PatchState::Downloading),
            2 => Some(PatchState::Patching),
            3 => Some(PatchState::Done),
            4 => Some(PatchState::Error),
            _ => None,
        }
    }
}

impl TryFrom<u8> for PatchState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        PatchState::from_discriminant(value).ok_or_else(|| format!("unknown patcher state {value}"))
    }
}

impl From<PatchState> for u8 {
    fn from(state: PatchState) -> Self {
        state as u8
    }
}

/// Progress event pushed by the backend while patching.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchStatus {
    pub state: PatchState,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
}

impl PatchStatus {
    pub fn new(state: PatchState, current: u64, total: u64) -> Self {
        PatchStatus { state, current, total }
    }

    /// Progress in `[0, 1]`. A zero total while downloading counts as one unit
    /// so the division is always defined.
    pub fn percentage(&self) -> f64 {
        match self.state {
            PatchState::Checking => 0.0,
            PatchState::Downloading => (self.current as f64 / self.total.max(1) as f64).clamp(0.0, 1.0),
            PatchState::Patching | PatchState::Done | PatchState::Error => 1.0,
        }
    }
}
