//! Snapshot exclusion policy.
//!
//! Two name lists shape a snapshot without reading content:
//!
//! - `ignored_names`: directories emitted as a node with hash `ignored` and no
//!   children. Their contents are never listed. Dependency caches, version
//!   control metadata and build output live here.
//! - `skipped_names`: listing entries dropped silently, never emitted as nodes
//!   (platform trash directories).
//!
//! Both lists are compared against the entry's own name, never its full path.
//! Two snapshots are only comparable when both sides used the same policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default recursion limit: nodes deeper than this become `max_depth_reached`.
pub const DEFAULT_MAX_DEPTH: usize = 15;

/// Built-in noise directories.
const BUILTIN_IGNORED: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    ".cache",
    ".npm",
    ".ollama",
    ".rustup",
    ".cargo",
    ".m2",
];

/// Built-in platform trash directories.
const BUILTIN_SKIPPED: &[&str] = &[".Trash", ".Trashes"];

/// Policy applied by the tree builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPolicy {
    /// Maximum recursion depth, measured from the root (depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Directory names reported as `ignored` without being read
    #[serde(default = "default_ignored_names")]
    pub ignored_names: BTreeSet<String>,

    /// Entry names left out of directory listings entirely
    #[serde(default = "default_skipped_names")]
    pub skipped_names: BTreeSet<String>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_ignored_names() -> BTreeSet<String> {
    BUILTIN_IGNORED.iter().map(|s| s.to_string()).collect()
}

fn default_skipped_names() -> BTreeSet<String> {
    BUILTIN_SKIPPED.iter().map(|s| s.to_string()).collect()
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            ignored_names: default_ignored_names(),
            skipped_names: default_skipped_names(),
        }
    }
}

impl SnapshotPolicy {
    /// Whether a directory with this name is reported as `ignored`
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_names.contains(name)
    }

    /// Whether a listing entry with this name is dropped
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skipped_names.contains(name)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_ignored(mut self, name: impl Into<String>) -> Self {
        self.ignored_names.insert(name.into());
        self
    }

    /// Validate policy entries. Names are single path components.
    pub fn validate(&self) -> Result<(), String> {
        for name in self.ignored_names.iter().chain(self.skipped_names.iter()) {
            if name.is_empty() {
                return Err("Exclusion names cannot be empty".to_string());
            }
            if name.contains('/') || name.contains('\\') {
                return Err(format!(
                    "Exclusion name '{}' must be a single path component",
                    name
                ));
            }
        }
        Ok(())
    }
}
