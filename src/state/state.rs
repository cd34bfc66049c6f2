use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::{
    globals::{DEFAULT_MESSAGELIST_URL, DEFAULT_SERVERLIST_URL},
    model::{Banner, Character, CharacterId, Endpoint, LogEntry, Link, NewsMessage, Page, PatchStatus, Style},
    state::dialog::DialogState,
};

/// Everything the UI can see.
///
/// The store hands out clones of this; writing to a clone never reaches the
/// store. All mutation goes through [`crate::store::Store`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    pub page: Page,
    pub(crate) previous_page: Option<Page>,
    pub style: Style,
    pub locale: String,

    pub username: String,
    pub password: String,
    pub remember_me: bool,
    pub game_folder: Option<String>,
    pub current_folder: String,
    pub serverlist_url: String,
    pub messagelist_url: String,
    pub last_char_id: Option<CharacterId>,
    pub settings: BTreeMap<String, Value>,

    pub endpoints: Vec<Endpoint>,
    pub remote_endpoints: Vec<Endpoint>,
    pub current_endpoint: Option<Endpoint>,

    pub banners: Vec<Banner>,
    pub messages: Vec<NewsMessage>,
    pub links: Vec<Link>,
    pub banner_index: usize,

    pub characters: Vec<Character>,
    pub auth_loading: bool,
    pub character_loading: bool,

    pub log: Vec<LogEntry>,
    pub recent_log: Option<LogEntry>,

    pub patcher: PatchStatus,
    pub patcher_loading: bool,

    pub dialog: DialogState,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            page: Page::Login,
            previous_page: None,
            style: Style::Classic,
            locale: "en".to_string(),

            username: String::new(),
            password: String::new(),
            remember_me: false,
            game_folder: None,
            current_folder: String::new(),
            serverlist_url: DEFAULT_SERVERLIST_URL.to_string(),
            messagelist_url: DEFAULT_MESSAGELIST_URL.to_string(),
            last_char_id: None,
            settings: BTreeMap::new(),

            endpoints: Vec::new(),
            remote_endpoints: Vec::new(),
            current_endpoint: None,

            banners: Vec::new(),
            messages: Vec::new(),
            links: Vec::new(),
            banner_index: 0,

            characters: Vec::new(),
            auth_loading: false,
            character_loading: false,

            log: Vec::with_capacity(64),
            recent_log: None,

            patcher: PatchStatus::default(),
            patcher_loading: false,

            dialog: DialogState::default(),
        }
    }
}

impl AppState {
    pub(crate) fn endpoint_list(&self, remote: bool) -> &Vec<Endpoint> {
        if remote { &self.remote_endpoints } else { &self.endpoints }
    }

    pub(crate) fn endpoint_list_mut(&mut self, remote: bool) -> &mut Vec<Endpoint> {
        if remote { &mut self.remote_endpoints } else { &mut self.endpoints }
    }

    /// The server's banners, or the static set when it sent none.
    pub fn effective_banners(&self) -> Vec<Banner> {
        if self.banners.is_empty() { Banner::fallback() } else { self.banners.clone() }
    }

    pub fn effective_banner_count(&self) -> usize {
        if self.banners.is_empty() { Banner::fallback().len() } else { self.banners.len() }
    }

    /// The banner at `banner_index`, wrapped against the list as it is now.
    pub fn current_banner(&self) -> Option<Banner> {
        let banners = self.effective_banners();
        if banners.is_empty() {
            return None;
        }
        banners.get(self.banner_index % banners.len()).cloned()
    }

    /// The per-user folder override, else the folder the backend detected.
    pub fn effective_folder(&self) -> &str {
        self.game_folder.as_deref().filter(|folder| !folder.is_empty()).unwrap_or(&self.current_folder)
    }
}
