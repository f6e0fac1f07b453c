//! Error types for the fractal synchronization system.
//!
//! Snapshot building has no error type: per-node failures are carried as
//! sentinel hashes inside the tree. These errors cover the wire codec, the
//! sync channel and the CLI surface.

use std::path::PathBuf;
use thiserror::Error;

/// Wire codec errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to parse message: {0}")]
    Decode(serde_json::Error),

    #[error("Failed to encode message: {0}")]
    Encode(serde_json::Error),

    #[error("Failed to parse fractal tree response: {0}")]
    InvalidPayload(serde_json::Error),
}

/// Errors raised while requesting snapshots over a channel
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Host reported error: {0}")]
    Remote(String),

    #[error("{0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection closed before a response arrived")]
    Disconnected,

    #[error("Snapshot task failed: {0}")]
    Task(String),
}

/// CLI and configuration errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid snapshot file {path:?}: {message}")]
    InvalidSnapshot { path: PathBuf, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Sync error: {0}")]
    SyncError(#[from] SyncError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
