//! Hasher Implementation Verification Tests
//!
//! Checks that file and directory hashes are plain SHA-256 digests computed
//! the way any other peer would compute them.

use fractal_sync::tree::builder::assemble_directory;
use fractal_sync::tree::hasher;
use fractal_sync::tree::{HashOutcome, TreeNode};
use sha2::{Digest, Sha256};
use std::fs;
use tempfile::TempDir;

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Test that content hash matches SHA-256 directly
#[test]
fn test_content_hash_matches_sha256() {
    let content = b"test content";
    assert_eq!(hasher::compute_content_hash(content), sha256_hex(content));
}

#[test]
fn test_known_vectors() {
    assert_eq!(
        hasher::compute_content_hash(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        hasher::compute_content_hash(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_file_hash_reads_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("large.bin");
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&test_file, &content).unwrap();

    assert_eq!(
        hasher::compute_file_hash(&test_file),
        HashOutcome::Digest(sha256_hex(&content))
    );
}

#[test]
fn test_missing_file_is_unreadable() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(
        hasher::compute_file_hash(&temp_dir.path().join("gone.txt")),
        HashOutcome::Unreadable
    );
}

/// Directory hash is sha256 of child hash strings joined with "|"
#[test]
fn test_directory_hash_joins_child_hashes() {
    let children = vec![
        TreeNode::file("/r/a.txt", HashOutcome::Digest("h1".to_string()), 0.0),
        TreeNode::file("/r/b.txt", HashOutcome::Symlink, 0.0),
        TreeNode::directory("/r/c", HashOutcome::Ignored, 0.0, Vec::new()),
    ];
    assert_eq!(
        hasher::compute_directory_hash(&children),
        sha256_hex(b"h1|symlink|ignored")
    );
}

#[test]
fn test_empty_directory_hashes_empty_string() {
    let dir = assemble_directory("/r", 0.0, Vec::new());
    assert_eq!(dir.hash, HashOutcome::Digest(sha256_hex(b"")));
}

#[test]
fn test_directory_hash_ignores_names_and_mtimes() {
    let a = assemble_directory(
        "/one",
        1.0,
        vec![TreeNode::file("/one/x", HashOutcome::Digest("h".to_string()), 5.0)],
    );
    let b = assemble_directory(
        "/two",
        2.0,
        vec![TreeNode::file("/two/x", HashOutcome::Digest("h".to_string()), 9.0)],
    );
    assert_eq!(a.hash, b.hash);
}
