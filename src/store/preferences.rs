use serde::de::IgnoredAny;
use serde_json::{json, Value};

use crate::{
    backend::Command,
    error::CommandError,
    model::{Page, Style},
    store::Store,
};

impl Store {
    /// Switching style recreates the window, so the session restarts at login.
    pub async fn set_style(&self, style: Style) -> Result<(), CommandError> {
        self.update(|state| {
            state.style = style;
            state.page = Page::Login;
        });
        let _: IgnoredAny = self.invoke(Command::SetStyle, json!({ "style": style })).await?;
        Ok(())
    }

    pub async fn set_locale(&self, locale: &str) -> Result<(), CommandError> {
        self.inner.catalog.set_locale(locale);
        self.update(|state| state.locale = locale.to_string());
        let _: IgnoredAny = self.invoke(Command::SetLocale, json!({ "locale": locale })).await?;
        Ok(())
    }

    /// Writes the folder override optimistically. If the backend rejects it
    /// the previous value comes back, unless the folder was changed again in
    /// the meantime. The failure is only logged.
    pub async fn set_game_folder(&self, folder: Option<String>) {
        let previous = self.read(|state| state.game_folder.clone());
        self.update(|state| state.game_folder = folder.clone());

        let result = self.invoke::<IgnoredAny>(Command::SetGameFolder, json!({ "gameFolder": &folder })).await;
        match result {
            Ok(_) => {}
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                tracing::debug!("restoring game folder after: {}", e);
                self.update(|state| {
                    if state.game_folder == folder {
                        state.game_folder = previous;
                    }
                });
            }
        }
    }

    pub async fn set_serverlist_url(&self, url: &str) -> Result<(), CommandError> {
        self.update(|state| state.serverlist_url = url.to_string());
        let _: IgnoredAny = self.invoke(Command::SetServerlistUrl, json!({ "serverlistUrl": url })).await?;
        Ok(())
    }

    pub async fn set_messagelist_url(&self, url: &str) -> Result<(), CommandError> {
        self.update(|state| state.messagelist_url = url.to_string());
        let _: IgnoredAny = self.invoke(Command::SetMessagelistUrl, json!({ "messagelistUrl": url })).await?;
        Ok(())
    }

    /// Persists an opaque setting. The local copy changes only once the
    /// backend has stored it.
    pub async fn set_setting(&self, name: &str, value: Value) -> Result<(), CommandError> {
        let _: IgnoredAny = self.invoke(Command::SetSetting, json!({ "setting": name, "value": &value })).await?;
        self.update(|state| {
            state.settings.insert(name.to_string(), value);
        });
        Ok(())
    }
}
