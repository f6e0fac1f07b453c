//! Polling sync client with a per-path snapshot cache

use super::channel::SnapshotChannel;
use crate::error::SyncError;
use crate::tree::{self, Change, HashOutcome, TreeNode};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Client polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Delay between polls of the watched paths
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Time budget for one snapshot request
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Host agent address used by `fractal watch --remote`
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_url() -> String {
    "ws://localhost:1984".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            url: default_url(),
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be greater than zero".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than zero".to_string());
        }
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(format!("Host url '{}' must use ws:// or wss://", self.url));
        }
        Ok(())
    }
}

/// Outcome of one poll of one path
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// First snapshot seen for this path
    Initial {
        root_hash: HashOutcome,
        node_count: usize,
        latency_ms: f64,
    },
    /// Root hash matches the cache; nothing was diffed
    Unchanged {
        root_hash: HashOutcome,
        latency_ms: f64,
    },
    /// Root hash moved; `changes` lists the differing paths
    Changed {
        previous_hash: HashOutcome,
        root_hash: HashOutcome,
        changes: Vec<Change>,
        latency_ms: f64,
    },
}

/// Message produced by a running `SyncHandle`
#[derive(Debug, Clone, PartialEq)]
pub enum SyncUpdate {
    Event { path: String, event: SyncEvent },
    Failed { path: String, error: String },
}

type SnapshotCache = Arc<Mutex<HashMap<String, TreeNode>>>;

/// Keeps the last snapshot per path and reports what changed since
pub struct SyncClient<C> {
    channel: Arc<C>,
    cache: SnapshotCache,
}

impl<C> Clone for SyncClient<C> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<C: SnapshotChannel + 'static> SyncClient<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel: Arc::new(channel),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Last snapshot received for `path`
    pub fn cached(&self, path: &str) -> Option<TreeNode> {
        self.cache.lock().get(path).cloned()
    }

    /// Request one fresh snapshot and compare it with the cache.
    ///
    /// The cache only moves when the root hash moves.
    pub async fn poll_once(&self, path: &str) -> Result<SyncEvent, SyncError> {
        let response = self.channel.request_snapshot(path).await?;
        let latency_ms = response.latency_ms;
        let fresh = response.tree;
        let previous = self.cached(path);

        let event = match previous {
            None => SyncEvent::Initial {
                root_hash: fresh.hash.clone(),
                node_count: fresh.node_count(),
                latency_ms,
            },
            Some(previous) if previous.hash == fresh.hash => {
                debug!(path, root_hash = %fresh.hash, latency_ms, "Snapshot in sync");
                return Ok(SyncEvent::Unchanged {
                    root_hash: fresh.hash,
                    latency_ms,
                });
            }
            Some(previous) => {
                let changes = tree::changes(&previous, &fresh);
                info!(
                    path,
                    previous_hash = %previous.hash,
                    root_hash = %fresh.hash,
                    change_count = changes.len(),
                    "Snapshot changed"
                );
                SyncEvent::Changed {
                    previous_hash: previous.hash,
                    root_hash: fresh.hash.clone(),
                    changes,
                    latency_ms,
                }
            }
        };

        self.cache.lock().insert(path.to_string(), fresh);
        Ok(event)
    }

    /// Poll `paths` every `interval` on a background task.
    ///
    /// Polling stops when the returned handle is cancelled or dropped. A
    /// failed poll is reported and the next tick tries again.
    pub fn spawn(&self, paths: Vec<String>, interval: Duration) -> SyncHandle {
        let (updates_tx, updates_rx) = mpsc::channel(64);
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let client = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                for path in &paths {
                    let result = tokio::select! {
                        _ = cancel_rx.changed() => return,
                        result = client.poll_once(path) => result,
                    };
                    let update = match result {
                        Ok(event) => SyncUpdate::Event {
                            path: path.clone(),
                            event,
                        },
                        Err(e) => {
                            warn!(path = %path, error = %e, "Snapshot poll failed");
                            SyncUpdate::Failed {
                                path: path.clone(),
                                error: e.to_string(),
                            }
                        }
                    };
                    if updates_tx.send(update).await.is_err() {
                        return;
                    }
                }
            }
            debug!("Sync polling stopped");
        });

        SyncHandle {
            updates: updates_rx,
            cancel: cancel_tx,
            task,
        }
    }
}

/// Running poll task. Dropping the handle stops polling.
pub struct SyncHandle {
    updates: mpsc::Receiver<SyncUpdate>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Next update, or `None` once polling has stopped
    pub async fn next(&mut self) -> Option<SyncUpdate> {
        self.updates.recv().await
    }

    /// Ask the task to stop after the request in flight
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Cancel and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.cancel();
        self.updates.close();
        let _ = (&mut self.task).await;
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
