//! Integration tests for fractal snapshots, diffs and the host protocol

mod config_integration;
mod hasher_verification;
mod host_roundtrip;
mod tree_determinism;
