//! Property-based tests for snapshot comparison

use fractal_sync::tree::builder::assemble_directory;
use fractal_sync::tree::hasher;
use fractal_sync::tree::{diff, HashOutcome, TreeNode};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Filesystem shape used to generate snapshots
#[derive(Debug, Clone)]
enum Shape {
    File(Vec<u8>),
    Dir(BTreeMap<String, Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop::collection::vec(any::<u8>(), 0..4).prop_map(Shape::File);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::btree_map("[a-d]{1,2}", inner, 0..4).prop_map(Shape::Dir)
    })
}

fn root_shape() -> impl Strategy<Value = Shape> {
    prop::collection::btree_map("[a-d]{1,2}", shape(), 0..5).prop_map(Shape::Dir)
}

fn materialize(path: &str, shape: &Shape) -> TreeNode {
    match shape {
        Shape::File(content) => TreeNode::file(
            path,
            HashOutcome::Digest(hasher::compute_content_hash(content)),
            0.0,
        ),
        Shape::Dir(children) => assemble_directory(
            path,
            0.0,
            children
                .iter()
                .map(|(name, child)| materialize(&format!("{}/{}", path, name), child))
                .collect(),
        ),
    }
}

fn exists_in(tree: &TreeNode, path: &str) -> bool {
    tree.find(path).is_some()
}

proptest! {
    #[test]
    fn diff_with_itself_is_empty(s in root_shape()) {
        let tree = materialize("/r", &s);
        prop_assert!(diff(&tree, &tree).is_empty());
    }

    #[test]
    fn diff_is_symmetric(a in root_shape(), b in root_shape()) {
        let a = materialize("/r", &a);
        let b = materialize("/r", &b);
        prop_assert_eq!(diff(&a, &b), diff(&b, &a));
    }

    #[test]
    fn diff_empty_iff_root_hashes_match(a in root_shape(), b in root_shape()) {
        let a = materialize("/r", &a);
        let b = materialize("/r", &b);
        prop_assert_eq!(diff(&a, &b).is_empty(), a.hash == b.hash);
    }

    #[test]
    fn reported_paths_exist_on_some_side(a in root_shape(), b in root_shape()) {
        let a = materialize("/r", &a);
        let b = materialize("/r", &b);
        for path in diff(&a, &b) {
            prop_assert!(exists_in(&a, &path) || exists_in(&b, &path), "{} not found", path);
        }
    }
}
