use serde::de::IgnoredAny;
use serde_json::json;

use crate::{
    backend::Command,
    catalog::MessageArgs,
    error::CommandError,
    model::{Page, PatchState, PatchStatus},
    state::DialogKind,
    store::Store,
};

impl Store {
    pub fn dialog_patch(&self) {
        self.open_dialog(DialogKind::Patch);
    }

    /// Starts a patch run from the patch dialog; the dialog stays open with
    /// the error if the backend refuses.
    pub async fn dialog_start_patcher(&self) -> Result<(), CommandError> {
        self.confirm_dialog(|kind| matches!(kind, DialogKind::Patch)).await
    }

    /// Written before the call: a fresh `Checking` status and the busy flag,
    /// so progress events racing the reply are not overwritten. Written after:
    /// the page, unless the run already ended or was cancelled meanwhile.
    pub(crate) async fn start_patcher(&self) -> Result<(), CommandError> {
        let ticket = self.inner.requests.patcher.begin();
        self.update(|state| {
            state.patcher = PatchStatus::default();
            state.patcher_loading = true;
        });

        let result = self.invoke::<IgnoredAny>(Command::PatcherStart, json!({})).await;
        if !self.inner.requests.patcher.is_latest(ticket) {
            tracing::debug!("dropping superseded patcher_start reply");
            return Err(CommandError::Cancelled);
        }
        if let Err(e) = result {
            self.update(|state| state.patcher_loading = false);
            return Err(e);
        }

        self.update(|state| {
            if state.patcher_loading && !state.patcher.state.is_terminal() {
                state.page = Page::Patcher;
            }
        });
        Ok(())
    }

    /// Aborts the running patch at the user's request. Events still in
    /// flight for that run are ignored afterwards.
    pub async fn cancel_patcher(&self) -> Result<(), CommandError> {
        self.inner.requests.patcher.begin();
        self.update(|state| {
            state.patcher_loading = false;
            state.page = Page::Login;
        });
        let _: IgnoredAny = self.invoke(Command::PatcherStop, json!({})).await?;
        Ok(())
    }

    /// Applies a progress event from the backend. Events arriving while no
    /// run is active are dropped.
    ///
    /// `Done` finishes the run and shows the roster. `Error` stops the
    /// backend's run and returns to login.
    pub async fn update_patcher(&self, status: PatchStatus) {
        let mut active = false;
        self.update(|state| {
            active = state.patcher_loading;
            if !active {
                return;
            }
            state.patcher = status;
            match status.state {
                PatchState::Done => {
                    state.patcher_loading = false;
                    state.page = Page::Characters;
                }
                PatchState::Error => {
                    state.patcher_loading = false;
                    state.page = Page::Login;
                }
                PatchState::Checking | PatchState::Downloading | PatchState::Patching => {}
            }
        });
        if !active {
            tracing::debug!(?status, "ignoring patcher event without an active run");
            return;
        }

        tracing::trace!(?status, "patcher progress");
        match status.state {
            PatchState::Done => tracing::info!("patch finished"),
            PatchState::Error => {
                tracing::warn!("patch failed, stopping patcher");
                if let Err(e) = self.invoke::<IgnoredAny>(Command::PatcherStop, json!({})).await {
                    tracing::debug!("patcher_stop after failure: {}", e);
                }
            }
            PatchState::Checking | PatchState::Downloading | PatchState::Patching => {}
        }
    }

    pub fn patcher_percentage(&self) -> f64 {
        self.read(|state| state.patcher.percentage())
    }

    /// Status line for the current phase; finished runs have none.
    pub fn patcher_log(&self) -> Option<String> {
        let status = self.read(|state| state.patcher);
        match status.state {
            PatchState::Checking => Some(self.format_message("patcher-checking", &MessageArgs::new())),
            PatchState::Downloading => {
                let mut args = MessageArgs::new();
                args.insert("percentage".to_string(), json!((status.percentage() * 100.0).round() as u64));
                Some(self.format_message("patcher-downloading", &args))
            }
            PatchState::Patching => Some(self.format_message("patcher-patching", &MessageArgs::new())),
            PatchState::Done | PatchState::Error => None,
        }
    }
}
