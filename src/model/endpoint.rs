use serde::{Deserialize, Serialize};

/// A game server the launcher can authenticate against.
///
/// Endpoints are addressed by their position in the owning list while an edit
/// dialog is open; there is no stable id.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,
    pub host: String,
    pub launcher_port: Option<u16>,
    pub game_port: Option<u16>,
    pub game_path: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub is_remote: bool,
}

impl Endpoint {
    /// Blank fields coming out of an edit form become `None`, never a zero or
    /// empty placeholder.
    pub fn normalized(mut self) -> Self {
        self.launcher_port = self.launcher_port.filter(|port| *port != 0);
        self.game_port = self.game_port.filter(|port| *port != 0);
        self.game_path = self.game_path.filter(|path| !path.trim().is_empty());
        self
    }
}

/// Endpoint lists pushed by the backend after a serverlist refresh. A missing
/// list means "unchanged".
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointsPayload {
    #[serde(default)]
    pub endpoints: Option<Vec<Endpoint>>,
    #[serde(default)]
    pub remote_endpoints: Option<Vec<Endpoint>>,
}
