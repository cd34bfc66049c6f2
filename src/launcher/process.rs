//! Backend reached over the stdio of a child process.
//!
//! Every line is one JSON object. Requests carry an `id` which the backend
//! echoes in its reply; lines without an `id` are pushed events.

use std::{
    collections::HashMap,
    process::Stdio,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use anyhow::Context;
use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    process::{Child, Command as ProcessCommand},
    sync::{oneshot, Mutex as AsyncMutex},
};

use crate::{
    backend::{Backend, BackendEvent, Command},
    state::BackendConfig,
};

const EXITED: &str = "backend process exited";

type Reply = Result<Value, String>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    command: Command,
    args: &'a Value,
}

#[derive(Deserialize)]
struct Response {
    id: u64,
    #[serde(default)]
    ok: Option<Value>,
    #[serde(default)]
    err: Option<String>,
}

pub struct ProcessBackend {
    writer: AsyncMutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Pending,
    closed: Arc<AtomicBool>,
    next_id: AtomicU64,
    _child: Option<Child>,
}

impl ProcessBackend {
    /// Starts the backend and returns it with the stream of events it pushes.
    pub fn spawn(config: &BackendConfig) -> anyhow::Result<(Self, UnboundedReceiver<BackendEvent>)> {
        let mut cmd = ProcessCommand::new(&config.program);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().with_context(|| format!("failed to spawn the backend process {}", config.program))?;
        let stdin = child.stdin.take().context("backend stdin was not captured")?;
        let stdout = child.stdout.take().context("backend stdout was not captured")?;

        let (mut backend, events) = Self::from_pipes(stdin, stdout);
        backend._child = Some(child);
        Ok((backend, events))
    }

    /// Speaks the protocol over arbitrary pipes. Must be called inside a
    /// tokio runtime; the reader task is spawned immediately.
    pub fn from_pipes<W, R>(writer: W, reader: R) -> (Self, UnboundedReceiver<BackendEvent>)
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let (events_tx, events_rx) = mpsc::unbounded();

        tokio::spawn(read_loop(BufReader::new(reader), pending.clone(), closed.clone(), events_tx));

        let backend = ProcessBackend {
            writer: AsyncMutex::new(Box::new(writer)),
            pending,
            closed,
            next_id: AtomicU64::new(1),
            _child: None,
        };
        (backend, events_rx)
    }

    fn forget(&self, id: u64) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&id);
    }
}

#[async_trait]
impl Backend for ProcessBackend {
    async fn invoke(&self, command: Command, args: Value) -> Result<Value, String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).insert(id, tx);
        if self.closed.load(Ordering::Acquire) {
            self.forget(id);
            return Err(EXITED.to_string());
        }

        let mut line = serde_json::to_vec(&Request { id, command, args: &args }).map_err(|e| e.to_string())?;
        line.push(b'\n');

        let written = {
            let mut writer = self.writer.lock().await;
            match writer.write_all(&line).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = written {
            self.forget(id);
            return Err(format!("failed writing to the backend: {e}"));
        }

        rx.await.unwrap_or_else(|_| Err(EXITED.to_string()))
    }
}

async fn read_loop<R>(
    mut reader: BufReader<R>,
    pending: Pending,
    closed: Arc<AtomicBool>,
    events: UnboundedSender<BackendEvent>,
) where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("failed reading from the backend: {}", e);
                break;
            }
        }

        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("backend sent invalid json: {}", e);
                continue;
            }
        };

        if value.get("id").is_some() {
            match serde_json::from_value::<Response>(value) {
                Ok(response) => {
                    let reply = match response.err {
                        Some(err) => Err(err),
                        None => Ok(response.ok.unwrap_or(Value::Null)),
                    };
                    let waiter = pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&response.id);
                    match waiter {
                        Some(waiter) => {
                            let _ = waiter.send(reply);
                        }
                        None => tracing::debug!(id = response.id, "reply for unknown request"),
                    }
                }
                Err(e) => tracing::warn!("backend sent a malformed reply: {}", e),
            }
        } else {
            match serde_json::from_value::<BackendEvent>(value) {
                Ok(event) => {
                    let _ = events.unbounded_send(event);
                }
                Err(e) => tracing::warn!("backend sent an unknown event: {}", e),
            }
        }
    }

    closed.store(true, Ordering::Release);
    let waiters: Vec<_> = pending.lock().unwrap_or_else(PoisonError::into_inner).drain().map(|(_, tx)| tx).collect();
    for waiter in waiters {
        let _ = waiter.send(Err(EXITED.to_string()));
    }
    tracing::debug!("backend reader finished");
}
