use std::future::Future;

use crate::{error::CommandError, state::DialogKind, store::Store};

impl Store {
    /// Opens `kind`, replacing whatever dialog was open.
    pub(crate) fn open_dialog(&self, kind: DialogKind) {
        self.update(|state| {
            state.dialog.kind = Some(kind);
            state.dialog.error.clear();
            state.dialog.loading = false;
            state.dialog.open = true;
        });
    }

    pub fn close_dialog(&self) {
        self.update(|state| state.dialog.open = false);
    }

    /// Runs the confirm action of whichever dialog is open.
    pub async fn dialog_callback(&self) -> Result<(), CommandError> {
        self.confirm_dialog(|_| true).await
    }

    pub(crate) async fn confirm_dialog(&self, expected: impl FnOnce(&DialogKind) -> bool) -> Result<(), CommandError> {
        let kind = self.read(|state| state.dialog.kind.clone().filter(|kind| state.dialog.open && expected(kind)));
        let Some(kind) = kind else {
            tracing::error!("dialog confirm dispatched without a matching open dialog");
            return Err(CommandError::NoDialog);
        };

        match kind {
            DialogKind::DeleteCharacter(character) => {
                self.close_dialog_with(self.do_delete_character(character.id)).await
            }
            DialogKind::Server(draft) => self.close_dialog_with(self.save_endpoint_draft(draft)).await,
            DialogKind::Patch => self.close_dialog_with(self.start_patcher()).await,
        }
    }

    /// The dialog-close protocol.
    ///
    /// `loading` is raised while `action` runs. Success closes the dialog and
    /// clears its error. Cancellation only lowers `loading` and is not an
    /// error. Any other failure keeps the dialog open, pins the error text and
    /// is returned to the caller.
    async fn close_dialog_with<F>(&self, action: F) -> Result<(), CommandError>
    where
        F: Future<Output = Result<(), CommandError>>,
    {
        self.update(|state| state.dialog.loading = true);
        match action.await {
            Ok(()) => {
                self.update(|state| {
                    state.dialog.open = false;
                    state.dialog.error.clear();
                    state.dialog.loading = false;
                });
                Ok(())
            }
            Err(e) if e.is_cancelled() => {
                self.update(|state| state.dialog.loading = false);
                Ok(())
            }
            Err(e) => {
                self.update(|state| {
                    state.dialog.error = e.to_string();
                    state.dialog.loading = false;
                });
                Err(e)
            }
        }
    }
}
