//! Sync client: polls a host for snapshots and diffs them against a cache.
//!
//! The channel is a seam. `LocalChannel` answers in-process through the
//! same frame codec a network host uses; `WebSocketChannel` talks to a
//! remote `fractal serve`.

mod channel;
mod sync;

pub use channel::{LocalChannel, SnapshotChannel, WebSocketChannel};
pub use sync::{ClientConfig, SyncClient, SyncEvent, SyncHandle, SyncUpdate};
