//! Integration tests for tree building determinism

use fractal_sync::tree::builder::TreeBuilder;
use fractal_sync::tree::hasher;
use fractal_sync::tree::HashOutcome;
use std::fs;
use tempfile::TempDir;

/// Test that the same filesystem produces the same root hash
#[test]
fn test_same_filesystem_same_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    fs::write(root.join("file1.txt"), "content1").unwrap();
    fs::write(root.join("file2.txt"), "content2").unwrap();
    fs::create_dir(root.join("dir1")).unwrap();
    fs::write(root.join("dir1").join("file3.txt"), "content3").unwrap();

    let builder = TreeBuilder::new(root.clone());
    let tree1 = builder.build();
    let tree2 = builder.build();

    assert_eq!(tree1.hash, tree2.hash);
    assert_eq!(tree1, tree2);
}

/// Test that file content changes produce different root hashes
#[test]
fn test_file_content_change_different_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    fs::write(root.join("test.txt"), "content1").unwrap();
    let builder = TreeBuilder::new(root.clone());
    let root1 = builder.build().hash;

    fs::write(root.join("test.txt"), "content2").unwrap();
    let root2 = builder.build().hash;

    assert_ne!(root1, root2);
}

/// Test that file addition produces different root hash
#[test]
fn test_file_addition_different_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    fs::write(root.join("file1.txt"), "content").unwrap();
    let builder = TreeBuilder::new(root.clone());
    let root1 = builder.build().hash;

    fs::write(root.join("file2.txt"), "content").unwrap();
    let root2 = builder.build().hash;

    assert_ne!(root1, root2);
}

/// An empty directory contributes its hash, so adding one moves the root
#[test]
fn test_empty_directory_addition_different_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    fs::write(root.join("file1.txt"), "content").unwrap();
    let builder = TreeBuilder::new(root.clone());
    let root1 = builder.build().hash;

    fs::create_dir(root.join("empty")).unwrap();
    let root2 = builder.build().hash;

    assert_ne!(root1, root2);
}

/// Renaming a file with the same content and position keeps the root hash
#[test]
fn test_rename_without_reordering_keeps_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    fs::write(root.join("a1.txt"), "same").unwrap();
    let builder = TreeBuilder::new(root.clone());
    let before = builder.build().hash;

    fs::rename(root.join("a1.txt"), root.join("a2.txt")).unwrap();
    let after = builder.build().hash;

    assert_eq!(before, after);
}

/// Touching a file changes its mtime but not any hash
#[test]
fn test_mtime_does_not_affect_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let file = root.join("touch.txt");
    fs::write(&file, "stable").unwrap();

    let builder = TreeBuilder::new(root.clone());
    let before = builder.build().hash;

    fs::write(&file, "stable").unwrap();
    let after = builder.build().hash;

    assert_eq!(before, after);
}

/// Identical subtrees in different places hash identically
#[test]
fn test_identical_subtrees_share_hash() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();

    for name in ["left", "right"] {
        fs::create_dir_all(root.join(name).join("inner")).unwrap();
        fs::write(root.join(name).join("inner").join("f.txt"), "x").unwrap();
    }

    let tree = TreeBuilder::new(root.clone()).build();
    let left = &tree.children()[0];
    let right = &tree.children()[1];
    assert_ne!(left.path, right.path);
    assert_eq!(left.hash, right.hash);
}

/// A change deep in the tree moves every ancestor hash
#[test]
fn test_deep_change_propagates_to_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let deep = root.join("a").join("b").join("c");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("leaf.txt"), "one").unwrap();
    fs::write(root.join("sibling.txt"), "constant").unwrap();

    let builder = TreeBuilder::new(root.clone());
    let before = builder.build();
    fs::write(deep.join("leaf.txt"), "two").unwrap();
    let after = builder.build();

    assert_ne!(before.hash, after.hash);
    let a_before = &before.children()[0];
    let a_after = &after.children()[0];
    assert_ne!(a_before.hash, a_after.hash);
    assert_eq!(
        before.children()[1].hash,
        HashOutcome::Digest(hasher::compute_content_hash(b"constant"))
    );
    assert_eq!(before.children()[1].hash, after.children()[1].hash);
}
