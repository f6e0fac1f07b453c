//! Hash computation for snapshot nodes using SHA-256

use crate::tree::node::{HashOutcome, TreeNode};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::trace;

/// Separator placed between child hashes. Never produced by hex output.
pub const CHILD_SEPARATOR: &[u8] = b"|";

/// Compute the content hash of raw bytes as lowercase hex
pub fn compute_content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Hash the full content of a file.
///
/// Any read failure degrades to `HashOutcome::Unreadable`.
pub fn compute_file_hash(file_path: &Path) -> HashOutcome {
    match std::fs::read(file_path) {
        Ok(content) => HashOutcome::Digest(compute_content_hash(&content)),
        Err(e) => {
            trace!(path = %file_path.display(), error = %e, "File content unreadable");
            HashOutcome::Unreadable
        }
    }
}

/// Compute a directory hash from its children.
///
/// hash = sha256(child_0.hash || "|" || child_1.hash || ... )
///
/// Children must already be sorted by path; sentinel hashes participate
/// as their canonical strings. An empty directory hashes the empty string.
pub fn compute_directory_hash(children: &[TreeNode]) -> String {
    let mut hasher = Sha256::new();
    for (index, child) in children.iter().enumerate() {
        if index > 0 {
            hasher.update(CHILD_SEPARATOR);
        }
        hasher.update(child.hash.as_str().as_bytes());
    }
    hex::encode(hasher.finalize())
}
