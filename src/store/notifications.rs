use std::sync::atomic::Ordering;

use tokio::runtime::Handle;

use crate::{
    catalog::MessageArgs,
    model::{LogEntry, LogLevel},
    store::Store,
};

impl Store {
    pub fn log_text(&self, level: LogLevel, text: impl Into<String>) {
        self.push_log(LogEntry { level, message: text.into() });
    }

    /// Logs the catalog text for `key`, or the key itself when the catalog
    /// has no entry for it.
    pub fn log_message(&self, level: LogLevel, key: &str, args: &MessageArgs) {
        let message = self.format_message(key, args);
        self.push_log(LogEntry { level, message });
    }

    pub fn format_message(&self, key: &str, args: &MessageArgs) -> String {
        self.inner.catalog.format(key, args).unwrap_or_else(|| key.to_string())
    }

    /// Clears the recent slot now. The log itself is untouched.
    pub fn dismiss_recent_log(&self) {
        self.inner.recent_log_task.cancel();
        self.update(|state| state.recent_log = None);
    }

    fn push_log(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => tracing::info!(target: "launcher_client::notifications", "{}", entry.message),
            LogLevel::Warn => tracing::warn!(target: "launcher_client::notifications", "{}", entry.message),
            LogLevel::Error => tracing::error!(target: "launcher_client::notifications", "{}", entry.message),
        }

        // The sequence number is taken under the state lock so that the
        // recent slot always holds the entry with the highest number.
        let mut seq = 0;
        self.update(|state| {
            seq = self.inner.log_seq.fetch_add(1, Ordering::SeqCst) + 1;
            state.log.push(entry.clone());
            state.recent_log = Some(entry);
        });
        self.schedule_recent_log_expiry(seq);
    }

    fn schedule_recent_log_expiry(&self, seq: u64) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no runtime, recent log will not expire");
            return;
        };
        let store = self.downgrade();
        let window = self.inner.recent_log_window;
        let task = runtime.spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(store) = Store::upgrade(&store) {
                store.expire_recent_log(seq);
            }
        });
        // A newer entry may already have installed its own expiry.
        self.inner
            .recent_log_task
            .replace_if(task.abort_handle(), || self.inner.log_seq.load(Ordering::SeqCst) == seq);
    }

    fn expire_recent_log(&self, seq: u64) {
        self.inner.state.send_if_modified(|state| {
            if self.inner.log_seq.load(Ordering::SeqCst) != seq || state.recent_log.is_none() {
                return false;
            }
            state.recent_log = None;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{
        catalog::Templates,
        store::testing::{settle, store, store_with_catalog},
    };

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry { level, message: message.to_string() }
    }

    #[tokio::test(start_paused = true)]
    async fn recent_slot_expires_after_the_window() {
        let (store, _) = store();
        store.log_text(LogLevel::Info, "saved");
        assert_eq!(store.read(|s| s.recent_log.clone()), Some(entry(LogLevel::Info, "saved")));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(store.read(|s| s.recent_log.is_some()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        settle().await;
        assert_eq!(store.read(|s| s.recent_log.clone()), None);
        assert_eq!(store.read(|s| s.log.len()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn each_entry_restarts_the_window() {
        let (store, _) = store();
        store.log_text(LogLevel::Info, "first");
        tokio::time::sleep(Duration::from_secs(4)).await;
        store.log_text(LogLevel::Warn, "second");

        tokio::time::sleep(Duration::from_secs(4)).await;
        settle().await;
        assert_eq!(store.read(|s| s.recent_log.clone()), Some(entry(LogLevel::Warn, "second")));

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        settle().await;
        assert_eq!(store.read(|s| s.recent_log.clone()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn log_only_grows_and_recent_tracks_the_last_entry() {
        let (store, _) = store();
        for n in 0..6 {
            store.log_text(LogLevel::Info, format!("entry {n}"));
            assert_eq!(store.read(|s| s.log.len()), n + 1);
            assert_eq!(store.read(|s| s.recent_log.clone()), Some(entry(LogLevel::Info, &format!("entry {n}"))));
            tokio::time::sleep(Duration::from_secs(3)).await;
        }

        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(store.read(|s| s.log.len()), 6);
        assert_eq!(store.read(|s| s.recent_log.clone()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn late_expiry_of_an_older_entry_keeps_the_newest_timer() {
        let (store, _) = store();
        store.log_text(LogLevel::Info, "first");
        store.log_text(LogLevel::Warn, "second");
        // The first entry's expiry is installed after the second's.
        store.schedule_recent_log_expiry(1);

        assert_eq!(store.read(|s| s.recent_log.clone()), store.read(|s| s.log.last().cloned()));
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        settle().await;
        assert_eq!(store.read(|s| s.recent_log.clone()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_clears_immediately_and_keeps_the_log() {
        let (store, _) = store();
        store.log_text(LogLevel::Error, "boom");
        store.dismiss_recent_log();

        assert_eq!(store.read(|s| s.recent_log.clone()), None);
        assert_eq!(store.read(|s| s.log.clone()), vec![entry(LogLevel::Error, "boom")]);
    }

    #[tokio::test]
    async fn log_message_falls_back_to_the_key() {
        let catalog = Templates::default().with_message("en", "export-character-success", "Saved to { $location }");
        let (store, _) = store_with_catalog(catalog);
        let args = json!({"location": "./saves/1-Rin.json"}).as_object().cloned().unwrap();

        store.log_message(LogLevel::Info, "export-character-success", &args);
        store.log_message(LogLevel::Info, "unknown-key", &args);

        let messages: Vec<String> = store.read(|s| s.log.iter().map(|e| e.message.clone()).collect());
        assert_eq!(messages, vec!["Saved to ./saves/1-Rin.json".to_string(), "unknown-key".to_string()]);
    }
}
