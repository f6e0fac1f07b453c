//! Tree builder for constructing fractal snapshots
//!
//! The walk is a depth-first, sequential recursion: each child is built
//! completely before its next sibling. Nothing here returns an error. A node
//! that cannot be inspected is emitted with a sentinel hash so that its
//! siblings and ancestors are still hashed.

use crate::ignore::SnapshotPolicy;
use crate::tree::hasher;
use crate::tree::node::{HashOutcome, TreeNode};
use crate::tree::path;
use std::ffi::OsString;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{Instant, UNIX_EPOCH};
use tracing::{debug, info, instrument, trace};
use walkdir::WalkDir;

/// Builds one snapshot of a root path
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    root: PathBuf,
    policy: SnapshotPolicy,
}

impl TreeBuilder {
    /// Create a new tree builder for the given root path with the default policy
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: SnapshotPolicy::default(),
        }
    }

    /// Replace the exclusion policy
    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    /// Build the snapshot.
    ///
    /// Always returns a tree. A missing or unreadable root degrades to a
    /// single `error` node.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> TreeNode {
        let start = Instant::now();
        info!("Starting snapshot build");

        let root = path::normalize_root(&self.root);
        let tree = self.build_node(&root, 0);

        info!(
            node_count = tree.node_count(),
            root_hash = %tree.hash,
            duration_ms = start.elapsed().as_millis(),
            "Snapshot build completed"
        );
        tree
    }

    fn build_node(&self, node_path: &Path, depth: usize) -> TreeNode {
        let node_path_str = path::path_string(node_path);

        if depth > self.policy.max_depth {
            debug!(path = %node_path_str, depth, "Maximum depth reached");
            return TreeNode::directory(node_path_str, HashOutcome::MaxDepth, 0.0, Vec::new());
        }

        // lstat: symlinks are reported, never followed
        let metadata = match std::fs::symlink_metadata(node_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(path = %node_path_str, error = %e, "Failed to inspect node");
                return TreeNode::file(node_path_str, HashOutcome::Error, 0.0);
            }
        };
        let last_modified = modified_millis(&metadata);
        let file_type = metadata.file_type();

        if file_type.is_symlink() {
            trace!(path = %node_path_str, "Skipping symlink");
            TreeNode::file(node_path_str, HashOutcome::Symlink, last_modified)
        } else if file_type.is_file() {
            let hash = hasher::compute_file_hash(node_path);
            TreeNode::file(node_path_str, hash, last_modified)
        } else if file_type.is_dir() {
            self.build_directory(node_path, node_path_str, last_modified, depth)
        } else {
            debug!(path = %node_path_str, "Unsupported node type");
            TreeNode::file(node_path_str, HashOutcome::Unsupported, 0.0)
        }
    }

    fn build_directory(
        &self,
        dir_path: &Path,
        node_path_str: String,
        last_modified: f64,
        depth: usize,
    ) -> TreeNode {
        let ignored = dir_path
            .file_name()
            .map(|name| self.policy.is_ignored(&name.to_string_lossy()))
            .unwrap_or(false);
        if ignored {
            trace!(path = %node_path_str, "Directory ignored by policy");
            return TreeNode::directory(node_path_str, HashOutcome::Ignored, last_modified, Vec::new());
        }

        let mut children = Vec::new();
        for name in self.list_children(dir_path) {
            if self.policy.is_skipped(&name.to_string_lossy()) {
                continue;
            }
            children.push(self.build_node(&dir_path.join(&name), depth + 1));
        }

        assemble_directory(node_path_str, last_modified, children)
    }

    /// List the names of a directory's direct entries.
    ///
    /// A directory that cannot be listed yields no entries.
    fn list_children(&self, dir_path: &Path) -> Vec<OsString> {
        let mut names = Vec::new();
        let walker = WalkDir::new(dir_path)
            .follow_links(false)
            .min_depth(1)
            .max_depth(1);

        for entry in walker {
            match entry {
                Ok(entry) => names.push(entry.file_name().to_os_string()),
                Err(e) => {
                    debug!(path = %dir_path.display(), error = %e, "Failed to list directory entry");
                }
            }
        }
        names
    }
}

/// Sort children by path and seal them into a hashed directory node.
///
/// Sorting here is what makes the hash independent of listing order.
pub fn assemble_directory(
    path: impl Into<String>,
    last_modified: f64,
    mut children: Vec<TreeNode>,
) -> TreeNode {
    children.sort_by(|a, b| a.path.cmp(&b.path));
    let hash = hasher::compute_directory_hash(&children);
    TreeNode::directory(path, HashOutcome::Digest(hash), last_modified, children)
}

fn modified_millis(metadata: &Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
