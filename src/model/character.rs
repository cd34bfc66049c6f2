use serde::{Deserialize, Serialize};

pub type CharacterId = u32;

/// A character on the authenticated account. Owned by the backend; the store
/// only mirrors it.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub is_female: bool,
    pub weapon: u32,
    pub hr: u32,
    pub gr: u32,
    pub last_login: u32,
}

/// Roster part of the auth response.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthRoster {
    pub characters: Vec<Character>,
}

/// Result of `login` / `register`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub response: AuthRoster,
    #[serde(default)]
    pub has_patch: bool,
}
