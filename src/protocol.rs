//! Wire protocol between a host agent and a sync client.
//!
//! Every frame is one JSON object. Requests carry a correlation id chosen by
//! the client; responses echo it.
//!
//! ```text
//! -> { "id": "...", "type": "SYNC_FRACTAL_TREE", "payload": "/path" }
//! <- { "id": "...", "type": "COMMAND_SUCCESS", "payload": "{\"tree\":{...},\"latencyMs\":3}" }
//! <- { "id": "...", "type": "ERROR", "error": "Unknown command type: ..." }
//! ```
//!
//! The success payload is itself JSON text, encoded a second time as a string.

use crate::error::ProtocolError;
use crate::tree::TreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SYNC_FRACTAL_TREE: &str = "SYNC_FRACTAL_TREE";
pub const COMMAND_SUCCESS: &str = "COMMAND_SUCCESS";
pub const ERROR: &str = "ERROR";

/// Request type tag. Unrecognized tags are kept so the host can name them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestKind {
    SyncFractalTree,
    Unknown(String),
}

impl From<String> for RequestKind {
    fn from(value: String) -> Self {
        if value == SYNC_FRACTAL_TREE {
            RequestKind::SyncFractalTree
        } else {
            RequestKind::Unknown(value)
        }
    }
}

impl From<RequestKind> for String {
    fn from(value: RequestKind) -> Self {
        match value {
            RequestKind::SyncFractalTree => SYNC_FRACTAL_TREE.to_string(),
            RequestKind::Unknown(other) => other,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::SyncFractalTree => f.write_str(SYNC_FRACTAL_TREE),
            RequestKind::Unknown(other) => f.write_str(other),
        }
    }
}

/// Client to host frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(default)]
    pub payload: String,
}

impl Request {
    /// Snapshot request for `path` with a fresh correlation id
    pub fn sync_tree(path: impl Into<String>) -> Self {
        Self {
            id: new_request_id(),
            kind: RequestKind::SyncFractalTree,
            payload: path.into(),
        }
    }
}

/// Host to client frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    #[serde(rename = "COMMAND_SUCCESS")]
    Success { id: String, payload: String },
    #[serde(rename = "ERROR")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        error: String,
    },
}

impl Response {
    pub fn id(&self) -> Option<&str> {
        match self {
            Response::Success { id, .. } => Some(id),
            Response::Error { id, .. } => id.as_deref(),
        }
    }
}

/// Decoded payload of a successful snapshot request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub tree: TreeNode,
    /// Time the host spent building the snapshot
    pub latency_ms: f64,
}

impl SnapshotResponse {
    pub fn to_payload(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn from_payload(payload: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(payload).map_err(ProtocolError::InvalidPayload)
    }
}

/// Generate a correlation id (UUID v4, simple form)
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn encode_request(request: &Request) -> Result<String, ProtocolError> {
    serde_json::to_string(request).map_err(ProtocolError::Encode)
}

pub fn decode_request(frame: &str) -> Result<Request, ProtocolError> {
    serde_json::from_str(frame).map_err(ProtocolError::Decode)
}

pub fn encode_response(response: &Response) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(ProtocolError::Encode)
}

pub fn decode_response(frame: &str) -> Result<Response, ProtocolError> {
    serde_json::from_str(frame).map_err(ProtocolError::Decode)
}
