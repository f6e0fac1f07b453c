//! Path normalization utilities for snapshot paths

use std::path::{is_separator, Path, PathBuf};

/// Normalize a requested root path.
///
/// The path is otherwise kept verbatim (no canonicalization, no symlink
/// resolution): it is the logical identifier both sides compare.
/// Trailing platform separators are removed, except for the filesystem root.
/// The raw `OsStr` is kept so that non-UTF-8 roots stay readable.
#[cfg(unix)]
pub fn normalize_root(path: &Path) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let mut bytes = path.as_os_str().as_bytes();
    while bytes.len() > 1 && bytes.ends_with(b"/") {
        bytes = &bytes[..bytes.len() - 1];
    }
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub fn normalize_root(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) => PathBuf::from(normalize_path_string(text)),
        None => path.to_path_buf(),
    }
}

/// Remove trailing platform separators from a path string (except root)
pub fn normalize_path_string(path: &str) -> String {
    let mut result = path.to_string();
    while result.len() > 1 && result.ends_with(is_separator) {
        result.pop();
    }
    result
}

/// Render a path as the string used for `TreeNode::path`
pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
