//! Pruned comparison of two snapshots of the same logical path
//!
//! Matching hashes prove a whole subtree identical, so the work done is
//! proportional to the parts of the tree that actually changed.
//!
//! Cases, in priority order:
//! 1. both files: the path differs iff the hashes differ
//! 2. equal hashes: nothing below differs
//! 3. kind changed (file vs directory): report the path, do not recurse
//! 4. both directories: pair children by path, recurse into pairs, report
//!    unpaired children once (their descendants are not enumerated)

use crate::tree::node::{NodeKind, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How a reported path differs between the two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present on both sides with different content or kind
    Modified,
    /// Present only in the second snapshot
    Added,
    /// Present only in the first snapshot
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Modified => f.write_str("modified"),
            ChangeKind::Added => f.write_str("added"),
            ChangeKind::Removed => f.write_str("removed"),
        }
    }
}

/// One differing path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub change: ChangeKind,
}

/// Paths that differ between `a` and `b`. Empty means provably identical.
pub fn diff(a: &TreeNode, b: &TreeNode) -> BTreeSet<String> {
    diff_paths(a, b).into_iter().collect()
}

/// Differing paths in depth-first emission order.
///
/// The order carries no meaning; callers should treat the result as a set.
pub fn diff_paths(a: &TreeNode, b: &TreeNode) -> Vec<String> {
    changes(a, b).into_iter().map(|c| c.path).collect()
}

/// Differing paths with their classification
pub fn changes(a: &TreeNode, b: &TreeNode) -> Vec<Change> {
    let mut out = Vec::new();
    compare(a, b, &mut out);
    out
}

fn compare(a: &TreeNode, b: &TreeNode, out: &mut Vec<Change>) {
    if a.kind == NodeKind::File && b.kind == NodeKind::File {
        if a.hash != b.hash {
            out.push(modified(a));
        }
        return;
    }

    if a.hash == b.hash {
        return;
    }

    if a.kind != b.kind {
        out.push(modified(a));
        return;
    }

    let children_a = index_children(a);
    let children_b = index_children(b);

    for (path, child_a) in &children_a {
        match children_b.get(path) {
            Some(child_b) => compare(child_a, child_b, out),
            None => out.push(Change {
                path: path.to_string(),
                change: ChangeKind::Removed,
            }),
        }
    }

    for path in children_b.keys() {
        if !children_a.contains_key(path) {
            out.push(Change {
                path: path.to_string(),
                change: ChangeKind::Added,
            });
        }
    }
}

fn modified(node: &TreeNode) -> Change {
    Change {
        path: node.path.clone(),
        change: ChangeKind::Modified,
    }
}

fn index_children(node: &TreeNode) -> BTreeMap<&str, &TreeNode> {
    node.children()
        .iter()
        .map(|child| (child.path.as_str(), child))
        .collect()
}
