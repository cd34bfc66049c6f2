//! Contract with the privileged backend process.
//!
//! The backend is an opaque command executor: it takes a [`Command`] plus a
//! JSON argument object and eventually answers with a JSON value or an error
//! string. It can also push [`BackendEvent`]s at any time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{EndpointsPayload, LogLevel, MessagesPayload, PatchStatus};

/// The fixed RPC surface of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    InitialData,
    SetStyle,
    SetLocale,
    SetGameFolder,
    SetServerlistUrl,
    SetMessagelistUrl,
    SetSetting,
    SetEndpoints,
    SetRemoteEndpoints,
    SetCurrentEndpoint,
    Login,
    Register,
    CreateCharacter,
    SelectCharacter,
    DeleteCharacter,
    ExportCharacter,
    PatcherStart,
    PatcherStop,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::InitialData => "initial_data",
            Command::SetStyle => "set_style",
            Command::SetLocale => "set_locale",
            Command::SetGameFolder => "set_game_folder",
            Command::SetServerlistUrl => "set_serverlist_url",
            Command::SetMessagelistUrl => "set_messagelist_url",
            Command::SetSetting => "set_setting",
            Command::SetEndpoints => "set_endpoints",
            Command::SetRemoteEndpoints => "set_remote_endpoints",
            Command::SetCurrentEndpoint => "set_current_endpoint",
            Command::Login => "login",
            Command::Register => "register",
            Command::CreateCharacter => "create_character",
            Command::SelectCharacter => "select_character",
            Command::DeleteCharacter => "delete_character",
            Command::ExportCharacter => "export_character",
            Command::PatcherStart => "patcher_start",
            Command::PatcherStop => "patcher_stop",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executes commands on behalf of the store.
///
/// Implementations return the backend's error string untouched; mapping the
/// empty string to a cancellation happens in the store's gateway.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn invoke(&self, command: Command, args: Value) -> Result<Value, String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogPayload {
    pub level: LogLevel,
    pub message: String,
}

/// Events the backend pushes without being asked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum BackendEvent {
    Patcher(PatchStatus),
    Endpoints(EndpointsPayload),
    Messages(MessagesPayload),
    Log(LogPayload),
    /// Failure reported outside any command, carrying only its text.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PatchState;

    #[test]
    fn command_names_match_serde_names() {
        for command in [Command::InitialData, Command::SetRemoteEndpoints, Command::PatcherStop] {
            let encoded = serde_json::to_value(command).unwrap();
            assert_eq!(encoded, Value::String(command.as_str().to_string()));
        }
    }

    #[test]
    fn patcher_event_decodes() {
        let event: BackendEvent =
            serde_json::from_str(r#"{"event":"patcher","payload":{"state":3,"current":0,"total":0}}"#).unwrap();
        assert_eq!(event, BackendEvent::Patcher(PatchStatus::new(PatchState::Done, 0, 0)));
    }

    #[test]
    fn endpoints_event_keeps_missing_lists_absent() {
        let event: BackendEvent =
            serde_json::from_str(r#"{"event":"endpoints","payload":{"remoteEndpoints":[]}}"#).unwrap();
        let BackendEvent::Endpoints(payload) = event else { panic!("wrong event") };
        assert_eq!(payload.endpoints, None);
        assert_eq!(payload.remote_endpoints, Some(vec![]));
    }

    #[test]
    fn error_event_carries_a_bare_string() {
        let event: BackendEvent = serde_json::from_str(r#"{"event":"error","payload":"mhf.exe crashed"}"#).unwrap();
        assert_eq!(event, BackendEvent::Error("mhf.exe crashed".to_string()));
    }
}
