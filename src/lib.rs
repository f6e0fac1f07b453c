//! Fractal Sync: content-hashed directory snapshots
//!
//! A host walks a directory and summarizes every node with a digest of its
//! content (files) or of its sorted children's digests (directories). Two
//! snapshots of the same path can then be compared by pruning every subtree
//! whose digests already match.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod ignore;
pub mod logging;
pub mod protocol;
pub mod tree;
