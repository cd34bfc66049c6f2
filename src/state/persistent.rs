use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{
    globals::{BANNER_INTERVAL, RECENT_LOG_WINDOW},
    launcher::directories,
};

/// How to start the backend process.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig { program: "launcher-backend".to_string(), args: Vec::new() }
    }
}

/// Client-side settings, kept apart from the preferences the backend persists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub recent_log_secs: u64,
    pub banner_interval_secs: u64,
    pub log_filter: String,
    pub backend: BackendConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            recent_log_secs: RECENT_LOG_WINDOW.as_secs(),
            banner_interval_secs: BANNER_INTERVAL.as_secs(),
            log_filter: "info".to_string(),
            backend: BackendConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn recent_log_window(&self) -> Duration {
        Duration::from_secs(self.recent_log_secs.max(1))
    }

    pub fn banner_interval(&self) -> Duration {
        Duration::from_secs(self.banner_interval_secs.max(1))
    }

    pub fn load() -> Self {
        match directories::config_file() {
            Some(path) => Self::load_from(path),
            None => ClientConfig::default(),
        }
    }

    /// Missing or unreadable files give the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        let path = directories::config_file().context("no config directory on this platform")?;
        self.save_to(path).await
    }

    pub async fn save_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let to_save = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.context("failed creating config directory")?;
        }
        fs::write(path, to_save).await.context("failed writing configuration")?;

        Ok(())
    }
}
