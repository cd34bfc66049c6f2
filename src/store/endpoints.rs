use serde_json::json;

use crate::{
    backend::Command,
    error::CommandError,
    model::{Endpoint, EndpointContent},
    state::{DialogKind, EndpointDraft},
    store::{Report, Store},
};

impl Store {
    /// Persists a new endpoint list through the backend.
    ///
    /// Written after confirmation: the list. Nothing is written before, so a
    /// failure leaves the previous list in place. If the backend reports a
    /// different current endpoint, it is selected afterwards.
    pub async fn set_endpoints(&self, endpoints: Vec<Endpoint>, remote: bool) -> Result<(), CommandError> {
        let endpoints: Vec<Endpoint> =
            endpoints.into_iter().map(|endpoint| Endpoint { is_remote: remote, ..endpoint.normalized() }).collect();
        let ticket = self.inner.requests.endpoints(remote).begin();
        let current = self.read(|state| state.current_endpoint.clone());
        let command = if remote { Command::SetRemoteEndpoints } else { Command::SetEndpoints };

        let reported: Option<Endpoint> =
            self.invoke(command, json!({ "endpoints": &endpoints, "currentEndpoint": current })).await?;
        if !self.inner.requests.endpoints(remote).is_latest(ticket) {
            tracing::debug!(remote, "dropping superseded endpoint list");
            return Err(CommandError::Cancelled);
        }

        self.update(|state| *state.endpoint_list_mut(remote) = endpoints);

        let current = self.read(|state| state.current_endpoint.clone());
        if let Some(reported) = reported.filter(|reported| Some(reported) != current.as_ref()) {
            if let Err(e) = self.set_current_endpoint(reported).await {
                tracing::debug!("reselecting endpoint failed: {}", e);
            }
        }
        Ok(())
    }

    /// Selects `endpoint` and fetches its banners, messages and links.
    ///
    /// Written before the call: `current_endpoint`, which is kept even if the
    /// fetch fails. Written after: the content lists, reset to empty on failure.
    pub async fn set_current_endpoint(&self, endpoint: Endpoint) -> Result<(), CommandError> {
        let ticket = self.inner.requests.current_endpoint.begin();
        let report = Report::message("server-select-error").arg("server", endpoint.name.clone());
        let args = json!({ "currentEndpoint": &endpoint });
        self.update(|state| state.current_endpoint = Some(endpoint));

        let result = self.invoke_reporting::<EndpointContent>(Command::SetCurrentEndpoint, args, report).await;
        if !self.inner.requests.current_endpoint.is_latest(ticket) {
            tracing::debug!("dropping superseded endpoint content");
            return Err(CommandError::Cancelled);
        }

        match result {
            Ok(content) => {
                self.update(|state| {
                    state.banners = content.banners;
                    state.messages = content.messages;
                    state.links = content.links;
                });
                Ok(())
            }
            Err(e) => {
                self.update(|state| {
                    state.banners.clear();
                    state.messages.clear();
                    state.links.clear();
                });
                Err(e)
            }
        }
    }

    pub fn dialog_add_endpoint(&self, remote: bool) {
        let index = self.read(|state| state.endpoint_list(remote).len());
        let endpoint = Endpoint { is_remote: remote, ..Default::default() };
        self.open_dialog(DialogKind::Server(EndpointDraft { index, remote, endpoint, original: None }));
    }

    /// Opens the edit dialog on a copy of the endpoint at `index`.
    pub fn dialog_edit_endpoint(&self, index: usize, remote: bool) -> Result<(), CommandError> {
        let original = self
            .read(|state| state.endpoint_list(remote).get(index).cloned())
            .ok_or(CommandError::StaleEdit)?;
        self.open_dialog(DialogKind::Server(EndpointDraft {
            index,
            remote,
            endpoint: original.clone(),
            original: Some(original),
        }));
        Ok(())
    }

    /// Edits the staged endpoint of an open server dialog.
    pub fn update_edit_endpoint(&self, edit: impl FnOnce(&mut Endpoint)) {
        self.update(|state| {
            if let Some(DialogKind::Server(draft)) = &mut state.dialog.kind {
                edit(&mut draft.endpoint);
            }
        });
    }

    /// Closes the dialog right away, then persists the list without the
    /// edited endpoint.
    pub async fn dialog_remove_endpoint(&self) -> Result<(), CommandError> {
        let draft = self
            .read(|state| match &state.dialog.kind {
                Some(DialogKind::Server(draft)) if state.dialog.open => Some(draft.clone()),
                _ => None,
            })
            .ok_or(CommandError::NoDialog)?;

        let endpoints = match &draft.original {
            Some(original) => {
                let mut endpoints = self.checked_endpoint_list(&draft, original)?;
                endpoints.remove(draft.index);
                Some(endpoints)
            }
            None => None,
        };

        self.update(|state| {
            state.dialog.error.clear();
            state.dialog.open = false;
        });

        match endpoints {
            Some(endpoints) => self.set_endpoints(endpoints, draft.remote).await,
            None => Ok(()),
        }
    }

    /// Saves the staged endpoint through the dialog-close protocol.
    pub async fn dialog_save_endpoint(&self) -> Result<(), CommandError> {
        self.confirm_dialog(|kind| matches!(kind, DialogKind::Server(_))).await
    }

    pub(crate) async fn save_endpoint_draft(&self, draft: EndpointDraft) -> Result<(), CommandError> {
        let endpoints = match &draft.original {
            Some(original) => {
                let mut endpoints = self.checked_endpoint_list(&draft, original)?;
                endpoints[draft.index] = draft.endpoint.clone();
                endpoints
            }
            None => {
                let mut endpoints = self.read(|state| state.endpoint_list(draft.remote).clone());
                endpoints.push(draft.endpoint.clone());
                endpoints
            }
        };
        self.set_endpoints(endpoints, draft.remote).await
    }

    /// The current list, provided it still holds `original` at the draft's
    /// index.
    fn checked_endpoint_list(&self, draft: &EndpointDraft, original: &Endpoint) -> Result<Vec<Endpoint>, CommandError> {
        let endpoints = self.read(|state| state.endpoint_list(draft.remote).clone());
        if endpoints.get(draft.index) != Some(original) {
            tracing::debug!(index = draft.index, "endpoint list changed under an open edit");
            return Err(CommandError::StaleEdit);
        }
        Ok(endpoints)
    }
}
