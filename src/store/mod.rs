//! The process-wide state store.
//!
//! [`Store`] owns the one [`AppState`] of the session. Readers get snapshots
//! or subscribe to changes through a `tokio::sync::watch` channel; writers are
//! the operations in the submodules, each documenting which fields it writes
//! before the backend confirms and which only after.
//!
//! The store must be used from inside a tokio runtime: timers and the event
//! pump are tokio tasks.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError, Weak,
    },
    time::Duration,
};

use tokio::{sync::watch, task::AbortHandle};

use crate::{backend::Backend, catalog::MessageCatalog, state::{AppState, ClientConfig}};

mod banners;
mod dialog;
mod endpoints;
mod events;
mod gateway;
mod notifications;
mod patcher;
mod preferences;
mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use gateway::Report;

/// Cloneable handle to the shared store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<AppState>,
    backend: Arc<dyn Backend>,
    catalog: Arc<dyn MessageCatalog>,
    recent_log_window: Duration,
    banner_interval: Duration,
    recent_log_task: TaskSlot,
    banner_task: TaskSlot,
    log_seq: AtomicU64,
    requests: Requests,
}

#[derive(Default)]
struct Requests {
    current_endpoint: RequestSeq,
    endpoints: RequestSeq,
    remote_endpoints: RequestSeq,
    auth: RequestSeq,
    patcher: RequestSeq,
}

impl Requests {
    fn endpoints(&self, remote: bool) -> &RequestSeq {
        if remote { &self.remote_endpoints } else { &self.endpoints }
    }
}

/// Monotonic counter used to drop responses that a newer request of the same
/// kind has superseded.
#[derive(Default)]
struct RequestSeq(AtomicU64);

impl RequestSeq {
    fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}

/// Holds the one scheduled task of a concern. Installing a new task aborts the
/// previous one under the same lock.
#[derive(Default)]
struct TaskSlot(Mutex<Option<AbortHandle>>);

impl TaskSlot {
    fn replace(&self, handle: AbortHandle) {
        let previous = self.0.lock().unwrap_or_else(PoisonError::into_inner).replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Installs `handle` only while `current` holds, checked under the slot
    /// lock; otherwise the new task is aborted and the installed one kept.
    fn replace_if(&self, handle: AbortHandle, current: impl FnOnce() -> bool) {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if !current() {
            handle.abort();
            return;
        }
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    fn cancel(&self) {
        if let Some(previous) = self.0.lock().unwrap_or_else(PoisonError::into_inner).take() {
            previous.abort();
        }
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>, catalog: Arc<dyn MessageCatalog>, config: &ClientConfig) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Store {
            inner: Arc::new(Inner {
                state,
                backend,
                catalog,
                recent_log_window: config.recent_log_window(),
                banner_interval: config.banner_interval(),
                recent_log_task: TaskSlot::default(),
                banner_task: TaskSlot::default(),
                log_seq: AtomicU64::new(0),
                requests: Requests::default(),
            }),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.inner.state.send_modify(f);
    }

    fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    fn upgrade(inner: &Weak<Inner>) -> Option<Store> {
        inner.upgrade().map(|inner| Store { inner })
    }

    /// Stops both ambient timers. Dropping the last handle does the same.
    pub fn shutdown(&self) {
        self.inner.recent_log_task.cancel();
        self.inner.banner_task.cancel();
    }
}

/// Raises a busy flag and lowers it again on every exit path.
///
/// A guard tied to a request ticket leaves the flag raised if a newer request
/// of the same kind has started since; that request lowers it instead.
struct BusyGuard<'a> {
    store: &'a Store,
    flag: fn(&mut AppState) -> &mut bool,
    ticket: Option<(&'a RequestSeq, u64)>,
}

impl<'a> BusyGuard<'a> {
    fn raise(store: &'a Store, flag: fn(&mut AppState) -> &mut bool) -> Self {
        store.update(|state| *flag(state) = true);
        BusyGuard { store, flag, ticket: None }
    }

    fn raise_for(store: &'a Store, flag: fn(&mut AppState) -> &mut bool, seq: &'a RequestSeq, ticket: u64) -> Self {
        store.update(|state| *flag(state) = true);
        BusyGuard { store, flag, ticket: Some((seq, ticket)) }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if let Some((seq, ticket)) = self.ticket {
            if !seq.is_latest(ticket) {
                return;
            }
        }
        let flag = self.flag;
        self.store.update(|state| *flag(state) = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::store;

    #[tokio::test]
    async fn snapshots_are_detached_from_the_store() {
        let (store, _) = store();
        let mut snapshot = store.snapshot();
        snapshot.characters.push(Default::default());
        assert!(store.read(|state| state.characters.is_empty()));
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let (store, _) = store();
        let mut rx = store.subscribe();
        store.update(|state| state.username = "hunter".into());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().username, "hunter");
    }

    #[test]
    fn request_seq_only_accepts_latest_ticket() {
        let seq = RequestSeq::default();
        let first = seq.begin();
        assert!(seq.is_latest(first));
        let second = seq.begin();
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));
    }
}
