//! Helpers for working with root-relative paths.
//!
//! Every path the pipeline stores, caches or emits is relative to the
//! declared root and spelled with forward slashes, regardless of the
//! host platform's separator, so manifests are reproducible across
//! machines.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes `path` (no filesystem access) and renders it
/// with forward slashes.
pub fn normalize(path: &Path) -> String {
    let mut stack: Vec<std::ffi::OsString> = Vec::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                stack.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::Normal(part) => stack.push(part.to_os_string()),
        }
    }
    stack
        .iter()
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Expresses `path` (absolute or relative to the current directory)
/// relative to `root`, normalized with forward slashes.
pub fn relative_to(root: &Path, path: &Path) -> String {
    if let Ok(stripped) = path.strip_prefix(root) {
        return normalize(stripped);
    }
    // Fall back to lexical diffing of the two paths' components.
    let root_components: Vec<_> = root.components().collect();
    let path_components: Vec<_> = path.components().collect();
    let common = root_components
        .iter()
        .zip(path_components.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut rel = PathBuf::new();
    for _ in common..root_components.len() {
        rel.push("..");
    }
    for component in &path_components[common..] {
        rel.push(component.as_os_str());
    }
    normalize(&rel)
}

/// Joins a root-relative directory (the parent of some file) with a
/// `#include`/local-header spelling, producing a normalized,
/// root-relative string.
pub fn join_relative(base_rel_dir: &str, spelling: &str) -> String {
    let mut joined = PathBuf::from(base_rel_dir);
    joined.push(spelling);
    normalize(&joined)
}

/// Returns the root-relative directory containing `rel_path` (empty
/// string for a top-level file).
pub fn parent_of(rel_path: &str) -> &str {
    match rel_path.rfind('/') {
        Some(idx) => &rel_path[..idx],
        None => "",
    }
}

/// Replaces every `/` and `\` in `rel_path` with `__`, as required for
/// OBJECT record names in the manifest.
pub fn escape_object_name(rel_path: &str) -> String {
    rel_path.replace(['/', '\\'], "__")
}
