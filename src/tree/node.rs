//! Snapshot node types and their wire representation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node kind as reported on the wire (`"file"` or `"directory"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Directory => f.write_str("directory"),
        }
    }
}

/// Content hash of a node, or the reason no digest could be computed.
///
/// Sentinels travel on the wire as their canonical strings, so a snapshot
/// produced here compares equal to one produced by any other host that
/// speaks the same protocol. Any string that is not a sentinel is a digest.
///
/// Equality and hashing follow the wire string, so `Digest("symlink")`
/// equals `Symlink`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HashOutcome {
    /// Lowercase hex SHA-256 digest
    Digest(String),
    /// Recursion depth exceeded
    MaxDepth,
    /// Symbolic link, never traversed
    Symlink,
    /// Directory name is in the exclusion set
    Ignored,
    /// File exists but its content could not be read
    Unreadable,
    /// Neither file, directory nor symlink
    Unsupported,
    /// Unexpected failure while inspecting the node
    Error,
}

impl HashOutcome {
    pub const MAX_DEPTH: &'static str = "max_depth_reached";
    pub const SYMLINK: &'static str = "symlink";
    pub const IGNORED: &'static str = "ignored";
    pub const UNREADABLE: &'static str = "unreadable";
    pub const UNSUPPORTED: &'static str = "unsupported";
    pub const ERROR: &'static str = "error";

    pub fn as_str(&self) -> &str {
        match self {
            HashOutcome::Digest(digest) => digest,
            HashOutcome::MaxDepth => Self::MAX_DEPTH,
            HashOutcome::Symlink => Self::SYMLINK,
            HashOutcome::Ignored => Self::IGNORED,
            HashOutcome::Unreadable => Self::UNREADABLE,
            HashOutcome::Unsupported => Self::UNSUPPORTED,
            HashOutcome::Error => Self::ERROR,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, HashOutcome::Digest(_))
    }
}

impl PartialEq for HashOutcome {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for HashOutcome {}

impl std::hash::Hash for HashOutcome {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<String> for HashOutcome {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::MAX_DEPTH => HashOutcome::MaxDepth,
            Self::SYMLINK => HashOutcome::Symlink,
            Self::IGNORED => HashOutcome::Ignored,
            Self::UNREADABLE => HashOutcome::Unreadable,
            Self::UNSUPPORTED => HashOutcome::Unsupported,
            Self::ERROR => HashOutcome::Error,
            _ => HashOutcome::Digest(value),
        }
    }
}

impl From<HashOutcome> for String {
    fn from(value: HashOutcome) -> Self {
        match value {
            HashOutcome::Digest(digest) => digest,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for HashOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a snapshot.
///
/// Wire shape: `{ path, type, hash, lastModified, children? }`, where
/// `children` is present (possibly empty) only for directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub hash: HashOutcome,
    /// Modification time in milliseconds since the Unix epoch. Advisory only.
    pub last_modified: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Create a file (leaf) node
    pub fn file(path: impl Into<String>, hash: HashOutcome, last_modified: f64) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
            hash,
            last_modified,
            children: None,
        }
    }

    /// Create a directory node. Children are stored as given; callers that
    /// hash them must sort first (see `builder::assemble_directory`).
    pub fn directory(
        path: impl Into<String>,
        hash: HashOutcome,
        last_modified: f64,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
            hash,
            last_modified,
            children: Some(children),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Children of this node; empty for files.
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Total number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Find a node by exact path within this subtree
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if self.path == path {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(path))
    }

    /// Last path component, used for display
    pub fn name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.path)
    }
}
