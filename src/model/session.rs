use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    globals::{DEFAULT_MESSAGELIST_URL, DEFAULT_SERVERLIST_URL},
    model::{character::CharacterId, endpoint::Endpoint},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Login,
    Characters,
    Settings,
    Patcher,
}

/// Window style, sent to the backend as its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Style {
    #[default]
    Classic,
    Modern,
}

impl TryFrom<u32> for Style {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Style::Classic),
            1 => Ok(Style::Modern),
            other => Err(format!("unknown style {other}")),
        }
    }
}

impl From<Style> for u32 {
    fn from(style: Style) -> Self {
        style as u32
    }
}

/// Session snapshot returned by `initial_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialData {
    pub style: Style,
    pub locale: String,
    pub endpoints: Vec<Endpoint>,
    pub remote_endpoints: Vec<Endpoint>,
    pub current_endpoint: Option<Endpoint>,
    pub username: String,
    pub password: String,
    pub remember_me: bool,
    pub game_folder: Option<String>,
    pub current_folder: String,
    pub last_char_id: Option<CharacterId>,
    pub serverlist_url: String,
    pub messagelist_url: String,
    pub settings: BTreeMap<String, Value>,
}

impl Default for InitialData {
    fn default() -> Self {
        InitialData {
            style: Style::Classic,
            locale: "en".to_string(),
            endpoints: Vec::new(),
            remote_endpoints: Vec::new(),
            current_endpoint: None,
            username: String::new(),
            password: String::new(),
            remember_me: false,
            game_folder: None,
            current_folder: String::new(),
            last_char_id: None,
            serverlist_url: DEFAULT_SERVERLIST_URL.to_string(),
            messagelist_url: DEFAULT_MESSAGELIST_URL.to_string(),
            settings: BTreeMap::new(),
        }
    }
}
