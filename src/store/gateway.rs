use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    backend::Command,
    catalog::MessageArgs,
    error::CommandError,
    model::LogLevel,
    store::Store,
};

/// How a failed command is reported in the notification log.
///
/// Without a message key the backend's raw error text is logged; with one,
/// the key is resolved through the catalog with the error added as `error`.
#[derive(Debug, Clone, Default)]
pub struct Report {
    key: Option<&'static str>,
    args: MessageArgs,
    level: LogLevel,
}

impl Report {
    pub fn message(key: &'static str) -> Self {
        Report { key: Some(key), ..Default::default() }
    }

    pub fn arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.args.insert(name.to_string(), value.into());
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

impl Store {
    /// Runs `command` on the backend and decodes its result.
    ///
    /// Failures other than cancellation are logged once here, at `Error`
    /// level, before being returned.
    pub async fn invoke<T: DeserializeOwned>(&self, command: Command, args: Value) -> Result<T, CommandError> {
        self.invoke_reporting(command, args, Report::default()).await
    }

    pub async fn invoke_reporting<T: DeserializeOwned>(
        &self,
        command: Command,
        args: Value,
        report: Report,
    ) -> Result<T, CommandError> {
        tracing::debug!(%command, "invoking backend");
        let backend = self.inner.backend.clone();
        let result = match backend.invoke(command, args).await {
            Ok(value) => serde_json::from_value(value)
                .map_err(|source| CommandError::Decode { command: command.as_str(), source }),
            Err(message) => Err(CommandError::from_backend(message)),
        };

        if let Err(err) = &result {
            if err.is_cancelled() {
                tracing::debug!(%command, "command cancelled");
            } else {
                tracing::warn!(%command, "command failed: {}", err);
                self.report_failure(err, report);
            }
        }
        result
    }

    fn report_failure(&self, err: &CommandError, report: Report) {
        match report.key {
            Some(key) => {
                let mut args = report.args;
                args.insert("error".to_string(), Value::String(err.to_string()));
                self.log_message(report.level, key, &args);
            }
            None => self.log_text(report.level, err.to_string()),
        }
    }
}
