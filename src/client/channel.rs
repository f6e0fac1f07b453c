//! Snapshot channels

use crate::error::SyncError;
use crate::host::HostAgent;
use crate::protocol::{self, Request, Response, SnapshotResponse};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Request/response channel to a host that can build snapshots
#[async_trait]
pub trait SnapshotChannel: Send + Sync {
    /// Ask the host for a fresh snapshot of `path`
    async fn request_snapshot(&self, path: &str) -> Result<SnapshotResponse, SyncError>;
}

/// Turn a host response into a snapshot or the host's error
fn into_snapshot(response: Response) -> Result<SnapshotResponse, SyncError> {
    match response {
        Response::Success { payload, .. } => Ok(SnapshotResponse::from_payload(&payload)?),
        Response::Error { error, .. } => Err(SyncError::Remote(error)),
    }
}

/// In-process channel backed by a `HostAgent`
#[derive(Debug, Clone, Default)]
pub struct LocalChannel {
    agent: HostAgent,
}

impl LocalChannel {
    pub fn new(agent: HostAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl SnapshotChannel for LocalChannel {
    async fn request_snapshot(&self, path: &str) -> Result<SnapshotResponse, SyncError> {
        let request = Request::sync_tree(path);
        let frame = protocol::encode_request(&request)?;
        let agent = self.agent.clone();

        let reply = tokio::task::spawn_blocking(move || agent.handle_frame(&frame))
            .await
            .map_err(|e| SyncError::Task(e.to_string()))?;

        into_snapshot(protocol::decode_response(&reply)?)
    }
}

/// Requests awaiting a response. `closed` is set once the reader stops, so
/// later requests fail at once instead of waiting out their timeout.
#[derive(Default)]
struct PendingState {
    closed: bool,
    waiters: HashMap<String, oneshot::Sender<Response>>,
}

type Pending = Arc<Mutex<PendingState>>;

/// WebSocket channel to a remote host agent.
///
/// Responses are matched to requests by id, so several requests may be in
/// flight at once. Dropping the channel closes the connection.
pub struct WebSocketChannel {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: Pending,
    request_timeout: Duration,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WebSocketChannel {
    /// Connect to `url` (e.g. `ws://localhost:1984`)
    pub async fn connect(url: &str, request_timeout: Duration) -> Result<Self, SyncError> {
        let (socket, _) = tokio::time::timeout(request_timeout, connect_async(url))
            .await
            .map_err(|_| SyncError::Timeout(format!("Timed out connecting to {}", url)))?
            .map_err(|e| SyncError::Transport(format!("WebSocket connect failed: {}", e)))?;
        info!(url, "Connected to host agent");

        let (mut sink, mut source) = socket.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let pending: Pending = Arc::new(Mutex::new(PendingState::default()));

        let writer = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(message).await {
                    debug!(error = %e, "WebSocket send failed");
                    break;
                }
            }
        });

        let reader_pending = Arc::clone(&pending);
        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!(error = %e, "WebSocket receive failed");
                        break;
                    }
                };
                let response = match protocol::decode_response(&text) {
                    Ok(response) => response,
                    Err(e) => {
                        warn!(error = %e, "Failed to parse message");
                        continue;
                    }
                };
                let waiter = response
                    .id()
                    .and_then(|id| reader_pending.lock().waiters.remove(id));
                match waiter {
                    Some(waiter) => {
                        let _ = waiter.send(response);
                    }
                    None => debug!(?response, "Response with no waiting request"),
                }
            }
            // Wake every waiter with a disconnect
            let mut state = reader_pending.lock();
            state.closed = true;
            state.waiters.clear();
            debug!("Host connection closed");
        });

        Ok(Self {
            outgoing,
            pending,
            request_timeout,
            reader,
            writer,
        })
    }

    /// False once the host has closed the connection
    pub fn is_connected(&self) -> bool {
        !self.pending.lock().closed
    }
}

#[async_trait]
impl SnapshotChannel for WebSocketChannel {
    async fn request_snapshot(&self, path: &str) -> Result<SnapshotResponse, SyncError> {
        let request = Request::sync_tree(path);
        let frame = protocol::encode_request(&request)?;
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.pending.lock();
            if state.closed {
                return Err(SyncError::Disconnected);
            }
            state.waiters.insert(request.id.clone(), tx);
        }

        if self.outgoing.send(Message::Text(frame)).is_err() {
            self.pending.lock().waiters.remove(&request.id);
            return Err(SyncError::Transport(
                "Failed to send command over WebSocket.".to_string(),
            ));
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(response)) => into_snapshot(response),
            Ok(Err(_)) => Err(SyncError::Disconnected),
            Err(_) => {
                self.pending.lock().waiters.remove(&request.id);
                Err(SyncError::Timeout(format!(
                    "Command timed out after {} seconds: {} {}",
                    self.request_timeout.as_secs(),
                    request.kind,
                    path
                )))
            }
        }
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}
