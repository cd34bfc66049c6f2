use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::{backend::BackendEvent, model::LogLevel, store::Store};

impl Store {
    /// Spawns the pump that applies backend events in arrival order. It ends
    /// when the stream does or the last store handle is dropped.
    pub fn listen<S>(&self, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = BackendEvent> + Send + 'static,
    {
        let store = self.downgrade();
        tokio::spawn(async move {
            let mut events = std::pin::pin!(events);
            while let Some(event) = events.next().await {
                let Some(store) = Store::upgrade(&store) else {
                    break;
                };
                store.handle_event(event).await;
            }
            tracing::debug!("backend event stream closed");
        })
    }

    pub async fn handle_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::Patcher(status) => self.update_patcher(status).await,
            BackendEvent::Endpoints(payload) => {
                tracing::debug!(
                    endpoints = ?payload.endpoints.as_ref().map(Vec::len),
                    remote_endpoints = ?payload.remote_endpoints.as_ref().map(Vec::len),
                    "endpoint lists refreshed"
                );
                self.update(|state| {
                    if let Some(endpoints) = payload.endpoints {
                        state.endpoints = endpoints;
                    }
                    if let Some(remote_endpoints) = payload.remote_endpoints {
                        state.remote_endpoints = remote_endpoints;
                    }
                });
            }
            BackendEvent::Messages(payload) => self.update(|state| state.messages = payload.messages),
            BackendEvent::Log(payload) => self.log_text(payload.level, payload.message),
            BackendEvent::Error(message) => self.log_text(LogLevel::Error, message),
        }
    }
}
