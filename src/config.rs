//! Configuration System
//!
//! Layered configuration for the host agent, the sync client and snapshot
//! policy. Sources, lowest to highest precedence: built-in defaults, the
//! global config file, workspace config files, then `FRACTAL_` environment
//! variables.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

mod facade;
mod merge;
mod sources;

pub use crate::client::ClientConfig;
pub use crate::host::HostConfig;
pub use crate::ignore::SnapshotPolicy;
pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FractalConfig {
    /// Snapshot exclusion policy and depth limit
    #[serde(default)]
    pub snapshot: SnapshotPolicy,

    /// Host agent listener
    #[serde(default)]
    pub host: HostConfig,

    /// Sync client polling
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Snapshot(String),
    Host(String),
    Client(String),
    Logging(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Snapshot(msg) => write!(f, "Snapshot: {}", msg),
            ValidationError::Host(msg) => write!(f, "Host: {}", msg),
            ValidationError::Client(msg) => write!(f, "Client: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl FractalConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.snapshot.validate() {
            errors.push(ValidationError::Snapshot(e));
        }
        if let Err(e) = self.host.validate() {
            errors.push(ValidationError::Host(e));
        }
        if let Err(e) = self.client.validate() {
            errors.push(ValidationError::Client(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ApiError`
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
