//! Fractal directory tree
//!
//! Represents one directory as a content-addressed snapshot, where each node
//! (file or directory) carries a hash of its content or of its children.

pub mod builder;
pub mod diff;
pub mod hasher;
pub mod node;
pub mod path;

pub use builder::TreeBuilder;
pub use diff::{changes, diff, diff_paths, Change, ChangeKind};
pub use node::{HashOutcome, NodeKind, TreeNode};
