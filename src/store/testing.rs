//! Scripted backend for store tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    backend::{Backend, Command},
    catalog::Templates,
    state::ClientConfig,
    store::Store,
};

struct Scripted {
    delay: Duration,
    result: Result<Value, String>,
}

/// Answers each command with the next queued reply, or `null` when nothing is
/// queued, and records every call.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: Mutex<HashMap<Command, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(Command, Value)>>,
}

impl ScriptedBackend {
    fn push(&self, command: Command, delay: Duration, result: Result<Value, String>) {
        self.replies.lock().unwrap().entry(command).or_default().push_back(Scripted { delay, result });
    }

    pub fn reply(&self, command: Command, value: Value) {
        self.push(command, Duration::ZERO, Ok(value));
    }

    pub fn reply_after(&self, command: Command, delay: Duration, value: Value) {
        self.push(command, delay, Ok(value));
    }

    pub fn fail(&self, command: Command, error: &str) {
        self.push(command, Duration::ZERO, Err(error.to_string()));
    }

    pub fn fail_after(&self, command: Command, delay: Duration, error: &str) {
        self.push(command, delay, Err(error.to_string()));
    }

    pub fn calls(&self) -> Vec<(Command, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, command: Command) -> Vec<Value> {
        self.calls().into_iter().filter(|(c, _)| *c == command).map(|(_, args)| args).collect()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn invoke(&self, command: Command, args: Value) -> Result<Value, String> {
        self.calls.lock().unwrap().push((command, args));
        let scripted = self.replies.lock().unwrap().get_mut(&command).and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(Value::Null),
        }
    }
}

pub(crate) fn store_with_catalog(catalog: Templates) -> (Store, Arc<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::default());
    let store = Store::new(backend.clone(), Arc::new(catalog), &ClientConfig::default());
    (store, backend)
}

pub(crate) fn store() -> (Store, Arc<ScriptedBackend>) {
    store_with_catalog(Templates::default())
}

/// Lets spawned tasks that are already runnable make progress.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
