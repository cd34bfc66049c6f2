use serde::de::IgnoredAny;
use serde_json::{json, Value};

use crate::{
    backend::Command,
    catalog::MessageArgs,
    error::CommandError,
    model::{AuthResult, Character, CharacterId, InitialData, LogLevel, Page},
    state::{AppState, DialogKind},
    store::{BusyGuard, Report, Store},
};

fn auth_flag(state: &mut AppState) -> &mut bool {
    &mut state.auth_loading
}

fn character_flag(state: &mut AppState) -> &mut bool {
    &mut state.character_loading
}

impl Store {
    /// Loads the persisted session from the backend and brings the store up
    /// to date with it.
    pub async fn init(&self) -> Result<(), CommandError> {
        let data: InitialData = self.invoke(Command::InitialData, Value::Null).await?;
        tracing::info!(
            locale = %data.locale,
            endpoints = data.endpoints.len(),
            remote_endpoints = data.remote_endpoints.len(),
            "session loaded"
        );

        self.inner.catalog.set_locale(&data.locale);
        let current = data.current_endpoint.clone();
        self.update(|state| {
            state.style = data.style;
            state.locale = data.locale;
            state.username = data.username;
            state.password = data.password;
            state.remember_me = data.remember_me;
            state.game_folder = data.game_folder;
            state.current_folder = data.current_folder;
            state.serverlist_url = data.serverlist_url;
            state.messagelist_url = data.messagelist_url;
            state.last_char_id = data.last_char_id;
            state.settings = data.settings;
            state.endpoints = data.endpoints;
            state.remote_endpoints = data.remote_endpoints;
            state.current_endpoint = data.current_endpoint;
        });
        self.start_banner_rotation();

        if let Some(endpoint) = current {
            if let Err(e) = self.set_current_endpoint(endpoint).await {
                tracing::debug!("initial endpoint selection failed: {}", e);
            }
        }
        Ok(())
    }

    pub fn set_page(&self, page: Page) {
        self.update(|state| state.page = page);
    }

    /// Toggles the settings page, returning to the page it was opened from.
    pub fn on_settings_button(&self) {
        self.update(|state| {
            if state.page == Page::Settings {
                state.page = state.previous_page.take().unwrap_or_default();
            } else {
                state.previous_page = Some(state.page);
                state.page = Page::Settings;
            }
        });
    }

    pub async fn do_login(&self, username: &str, password: &str, remember_me: bool) -> Result<(), CommandError> {
        self.authenticate(Command::Login, "login-error", username, password, remember_me).await
    }

    pub async fn do_register(&self, username: &str, password: &str, remember_me: bool) -> Result<(), CommandError> {
        self.authenticate(Command::Register, "register-error", username, password, remember_me).await
    }

    /// Written before the call: the credentials and `auth_loading`. Written
    /// after: the roster and either the page or the patch dialog.
    async fn authenticate(
        &self,
        command: Command,
        error_key: &'static str,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<(), CommandError> {
        self.update(|state| {
            state.username = username.to_string();
            state.password = password.to_string();
            state.remember_me = remember_me;
        });
        let ticket = self.inner.requests.auth.begin();
        let _busy = BusyGuard::raise_for(self, auth_flag, &self.inner.requests.auth, ticket);

        let args = json!({ "username": username, "password": password, "rememberMe": remember_me });
        let result: AuthResult = self.invoke_reporting(command, args, Report::message(error_key)).await?;
        if !self.inner.requests.auth.is_latest(ticket) {
            tracing::debug!(%command, "dropping superseded auth response");
            return Err(CommandError::Cancelled);
        }

        tracing::info!(characters = result.response.characters.len(), has_patch = result.has_patch, "authenticated");
        self.update(|state| state.characters = result.response.characters);
        if result.has_patch {
            self.dialog_patch();
        } else {
            self.set_page(Page::Characters);
        }
        Ok(())
    }

    pub async fn do_create_character(&self) -> Result<(), CommandError> {
        let _busy = BusyGuard::raise(self, character_flag);
        let _: IgnoredAny = self
            .invoke_reporting(Command::CreateCharacter, Value::Null, Report::message("create-character-error"))
            .await?;
        Ok(())
    }

    /// Launches the game with `id`. The selection is remembered once the
    /// backend accepts it.
    pub async fn do_select_character(&self, id: CharacterId) -> Result<(), CommandError> {
        let _busy = BusyGuard::raise(self, character_flag);
        let _: IgnoredAny = self.invoke(Command::SelectCharacter, json!({ "characterId": id })).await?;
        self.update(|state| state.last_char_id = Some(id));
        Ok(())
    }

    pub(crate) async fn do_delete_character(&self, id: CharacterId) -> Result<(), CommandError> {
        let _busy = BusyGuard::raise(self, character_flag);
        let _: IgnoredAny = self
            .invoke_reporting(
                Command::DeleteCharacter,
                json!({ "characterId": id }),
                Report::message("delete-character-error"),
            )
            .await?;
        self.update(|state| state.characters.retain(|character| character.id != id));
        Ok(())
    }

    pub async fn do_export_character(&self, id: CharacterId) -> Result<(), CommandError> {
        let _busy = BusyGuard::raise(self, character_flag);
        let location: String = self
            .invoke_reporting(
                Command::ExportCharacter,
                json!({ "characterId": id }),
                Report::message("export-character-failed"),
            )
            .await?;

        let mut args = MessageArgs::new();
        args.insert("location".to_string(), Value::String(location));
        self.log_message(LogLevel::Info, "export-character-success", &args);
        Ok(())
    }

    pub fn dialog_delete_character(&self, character: Character) {
        self.open_dialog(DialogKind::DeleteCharacter(character));
    }

    pub async fn dialog_delete_character_confirm(&self) -> Result<(), CommandError> {
        self.confirm_dialog(|kind| matches!(kind, DialogKind::DeleteCharacter(_))).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        catalog::Templates,
        model::Endpoint,
        store::testing::{settle, store, store_with_catalog},
    };

    fn roster() -> Value {
        json!({
            "response": { "characters": [
                { "id": 1, "name": "Rin", "isFemale": true, "weapon": 3, "hr": 999, "gr": 50, "lastLogin": 1700000000 },
                { "id": 2, "name": "Kai" }
            ]},
            "hasPatch": false
        })
    }

    #[tokio::test]
    async fn login_without_patch_shows_the_roster() {
        let (store, backend) = store();
        backend.reply(Command::Login, roster());

        store.do_login("hunter", "secret", true).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.page, Page::Characters);
        assert!(!state.auth_loading);
        assert!(!state.dialog.open);
        assert_eq!(state.characters.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(state.characters[0].name, "Rin");
        assert_eq!(
            backend.calls_to(Command::Login),
            vec![json!({"username": "hunter", "password": "secret", "rememberMe": true})]
        );
    }

    #[tokio::test]
    async fn login_with_patch_opens_the_patch_dialog() {
        let (store, backend) = store();
        let mut reply = roster();
        reply["hasPatch"] = json!(true);
        backend.reply(Command::Login, reply);

        store.do_login("hunter", "secret", false).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.page, Page::Login);
        assert!(state.dialog.is_open(|kind| matches!(kind, DialogKind::Patch)));
        assert_eq!(state.characters.len(), 2);

        store.dialog_start_patcher().await.unwrap();
        assert_eq!(store.read(|s| s.page), Page::Patcher);
    }

    #[tokio::test]
    async fn failed_login_logs_and_clears_the_busy_flag() {
        let catalog = Templates::default().with_message("en", "login-error", "Login failed: { $error }");
        let (store, backend) = store_with_catalog(catalog);
        backend.fail(Command::Login, "wrong password");

        let err = store.do_login("hunter", "bad", false).await.unwrap_err();

        assert_eq!(err.to_string(), "wrong password");
        let state = store.snapshot();
        assert!(!state.auth_loading);
        assert_eq!(state.page, Page::Login);
        assert_eq!(state.username, "hunter");
        assert_eq!(state.log.last().map(|e| e.message.as_str()), Some("Login failed: wrong password"));
        assert_eq!(state.log.last().map(|e| e.level), Some(LogLevel::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn busy_flag_is_raised_while_authenticating() {
        let (store, backend) = store();
        backend.reply_after(Command::Register, Duration::from_secs(1), roster());

        let task = tokio::spawn({
            let store = store.clone();
            async move { store.do_register("new", "pw", false).await }
        });
        settle().await;
        assert!(store.read(|s| s.auth_loading));

        task.await.unwrap().unwrap();
        assert!(!store.read(|s| s.auth_loading));
        assert_eq!(backend.calls_to(Command::Register).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_login_is_dropped() {
        let (store, backend) = store();
        let mut slow = roster();
        slow["response"]["characters"] = json!([{ "id": 9, "name": "Old" }]);
        backend.reply_after(Command::Login, Duration::from_secs(2), slow);
        backend.reply_after(Command::Login, Duration::from_secs(1), roster());

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.do_login("a", "pw", false).await }
        });
        settle().await;
        store.do_login("b", "pw", false).await.unwrap();

        assert!(first.await.unwrap().unwrap_err().is_cancelled());
        assert_eq!(store.read(|s| s.characters.iter().map(|c| c.id).collect::<Vec<_>>()), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_flag_stays_up_until_the_latest_login_answers() {
        let (store, backend) = store();
        backend.reply_after(Command::Login, Duration::from_secs(1), roster());
        backend.reply_after(Command::Login, Duration::from_secs(3), roster());

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.do_login("a", "pw", false).await }
        });
        settle().await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.do_login("b", "pw", false).await }
        });
        settle().await;

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        settle().await;
        assert!(first.is_finished());
        assert!(!second.is_finished());
        assert!(store.read(|s| s.auth_loading));

        second.await.unwrap().unwrap();
        assert!(first.await.unwrap().unwrap_err().is_cancelled());
        assert!(!store.read(|s| s.auth_loading));
        assert_eq!(store.read(|s| s.page), Page::Characters);
    }

    #[tokio::test]
    async fn export_logs_the_location() {
        let catalog = Templates::default().with_message("en", "export-character-success", "Exported to { $location }");
        let (store, backend) = store_with_catalog(catalog);
        backend.reply(Command::ExportCharacter, json!("/saves/1-Rin.bin"));

        store.do_export_character(1).await.unwrap();

        let state = store.snapshot();
        assert!(!state.character_loading);
        assert_eq!(
            state.recent_log.map(|e| (e.level, e.message)),
            Some((LogLevel::Info, "Exported to /saves/1-Rin.bin".to_string()))
        );
        assert_eq!(backend.calls_to(Command::ExportCharacter), vec![json!({"characterId": 1})]);
    }

    #[tokio::test]
    async fn select_records_the_last_character() {
        let (store, backend) = store();
        store.do_select_character(4).await.unwrap();
        assert_eq!(store.read(|s| s.last_char_id), Some(4));

        backend.fail(Command::SelectCharacter, "game already running");
        assert!(store.do_select_character(5).await.is_err());
        let state = store.snapshot();
        assert_eq!(state.last_char_id, Some(4));
        assert!(!state.character_loading);
        assert_eq!(state.log.last().map(|e| e.message.as_str()), Some("game already running"));
    }

    #[tokio::test]
    async fn create_character_sends_no_arguments() {
        let (store, backend) = store();
        store.do_create_character().await.unwrap();
        assert_eq!(backend.calls_to(Command::CreateCharacter), vec![Value::Null]);
        assert!(!store.read(|s| s.character_loading));
    }

    #[tokio::test]
    async fn settings_button_toggles_back_to_the_previous_page() {
        let (store, _) = store();
        store.set_page(Page::Characters);

        store.on_settings_button();
        assert_eq!(store.read(|s| s.page), Page::Settings);
        store.on_settings_button();
        assert_eq!(store.read(|s| s.page), Page::Characters);

        store.set_page(Page::Settings);
        store.on_settings_button();
        assert_eq!(store.read(|s| s.page), Page::Login);
    }

    #[tokio::test]
    async fn init_populates_the_store_and_selects_the_endpoint() {
        let catalog = Templates::default()
            .with_message("en", "greeting", "Hello")
            .with_message("jp", "greeting", "Konnichiwa");
        let (store, backend) = store_with_catalog(catalog);
        backend.reply(
            Command::InitialData,
            json!({
                "style": 1,
                "locale": "jp",
                "endpoints": [{ "name": "Main", "host": "127.0.0.1", "gamePort": 53310, "version": "ZZ" }],
                "remoteEndpoints": [],
                "currentEndpoint": { "name": "Main", "host": "127.0.0.1", "gamePort": 53310, "version": "ZZ" },
                "username": "hunter",
                "rememberMe": true,
                "currentFolder": "C:/MHF",
                "lastCharId": 2
            }),
        );
        backend.reply(
            Command::SetCurrentEndpoint,
            json!({ "banners": [{ "src": "a.png", "link": "" }], "messages": [], "links": [] }),
        );

        store.init().await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.locale, "jp");
        assert_eq!(state.username, "hunter");
        assert!(state.remember_me);
        assert_eq!(state.effective_folder(), "C:/MHF");
        assert_eq!(state.last_char_id, Some(2));
        assert_eq!(state.endpoints.len(), 1);
        assert_eq!(state.current_endpoint.as_ref().map(|e: &Endpoint| e.name.as_str()), Some("Main"));
        assert_eq!(state.banners.len(), 1);
        assert_eq!(store.format_message("greeting", &Default::default()), "Konnichiwa");
        store.shutdown();
    }

    #[tokio::test]
    async fn init_survives_a_failed_endpoint_selection() {
        let (store, backend) = store();
        backend.reply(
            Command::InitialData,
            json!({ "currentEndpoint": { "name": "Down", "host": "10.0.0.1", "gamePort": 1, "version": "ZZ" } }),
        );
        backend.fail(Command::SetCurrentEndpoint, "unreachable");

        store.init().await.unwrap();

        let state = store.snapshot();
        assert!(state.banners.is_empty());
        assert_eq!(state.current_endpoint.map(|e| e.name), Some("Down".to_string()));
        assert_eq!(state.log.len(), 1);
        store.shutdown();
    }
}
