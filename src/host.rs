//! Host agent: answers snapshot requests for the machine that owns the filesystem.
//!
//! Requests are independent. Each one builds a fresh snapshot and shares no
//! mutable state with any other, so the same agent can serve any number of
//! connections concurrently.

mod server;

pub use server::{HostConfig, HostServer};

use crate::ignore::SnapshotPolicy;
use crate::protocol::{self, Request, RequestKind, Response, SnapshotResponse};
use crate::tree::TreeBuilder;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Stateless request handler
#[derive(Debug, Clone)]
pub struct HostAgent {
    policy: Arc<SnapshotPolicy>,
}

impl Default for HostAgent {
    fn default() -> Self {
        Self::new(SnapshotPolicy::default())
    }
}

impl HostAgent {
    pub fn new(policy: SnapshotPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    /// Build a snapshot of `path` and time it. Blocks on filesystem I/O.
    pub fn snapshot(&self, path: &str) -> SnapshotResponse {
        let start = Instant::now();
        let tree = TreeBuilder::new(path)
            .with_policy(self.policy.as_ref().clone())
            .build();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        SnapshotResponse { tree, latency_ms }
    }

    /// Answer one decoded request
    pub fn handle_request(&self, request: &Request) -> Response {
        match &request.kind {
            RequestKind::SyncFractalTree => {
                debug!(id = %request.id, path = %request.payload, "Snapshot requested");
                match self.snapshot(&request.payload).to_payload() {
                    Ok(payload) => Response::Success {
                        id: request.id.clone(),
                        payload,
                    },
                    Err(e) => {
                        error!(id = %request.id, error = %e, "Failed to encode snapshot");
                        Response::Error {
                            id: Some(request.id.clone()),
                            error: e.to_string(),
                        }
                    }
                }
            }
            RequestKind::Unknown(kind) => {
                warn!(id = %request.id, kind = %kind, "Unknown command type");
                Response::Error {
                    id: Some(request.id.clone()),
                    error: format!("Unknown command type: {}", kind),
                }
            }
        }
    }

    /// Decode a raw frame, answer it and encode the reply.
    ///
    /// Frames that do not parse are answered with an id-less `ERROR`.
    pub fn handle_frame(&self, frame: &str) -> String {
        let response = match protocol::decode_request(frame) {
            Ok(request) => self.handle_request(&request),
            Err(e) => {
                warn!(error = %e, "Rejected malformed frame");
                Response::Error {
                    id: None,
                    error: e.to_string(),
                }
            }
        };

        protocol::encode_response(&response).unwrap_or_else(|e| {
            error!(error = %e, "Failed to encode response");
            serde_json::json!({ "type": protocol::ERROR, "error": e.to_string() }).to_string()
        })
    }
}
