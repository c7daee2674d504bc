//! Component C: the File-Tree Walker.
//!
//! Recursively enumerates candidate files under the declared root,
//! honoring directory and file exclusions. Exclusions are matched by
//! normalized-path identity, not by regex, even though the CLI's
//! historical help text says otherwise (see `config.rs`).

use crate::extmap::ExtensionMap;
use crate::relpath;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct Walker<'a> {
    root: &'a Path,
    ext_map: &'a ExtensionMap,
    excluded_dirs: Vec<String>,
    excluded_files: Vec<String>,
}

impl<'a> Walker<'a> {
    pub fn new(
        root: &'a Path,
        ext_map: &'a ExtensionMap,
        excluded_dirs: Vec<String>,
        excluded_files: Vec<String>,
    ) -> Self {
        Self {
            root,
            ext_map,
            excluded_dirs,
            excluded_files,
        }
    }

    /// Root-relative paths (forward-slash spelled) of every candidate
    /// file under the root, in a deterministic order.
    pub fn walk(&self) -> Vec<PathBuf> {
        self.walk_in(self.root)
    }

    /// Like [`walk`](Self::walk), but starts the recursive traversal at
    /// `start` instead of the root itself. Relative paths in the result
    /// are still expressed against `self.root`, so this is how the
    /// pipeline walks each `-f/--folders` entry while keeping every
    /// emitted path root-relative.
    pub fn walk_in(&self, start: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let walker = WalkDir::new(start).sort_by_file_name().into_iter();
        for entry in walker.filter_entry(|entry| !self.is_excluded_dir(entry.path())) {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if self.is_excluded_file(path) {
                continue;
            }
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let ext = format!(".{ext}");
            if self.ext_map.is_candidate_ext(&ext) {
                found.push(path.to_path_buf());
            }
        }
        found
    }

    fn is_excluded_dir(&self, path: &Path) -> bool {
        if path == self.root {
            return false;
        }
        let rel = relpath::relative_to(self.root, path);
        self.excluded_dirs.iter().any(|excluded| &rel == excluded)
    }

    fn is_excluded_file(&self, path: &Path) -> bool {
        let rel = relpath::relative_to(self.root, path);
        self.excluded_files.iter().any(|excluded| &rel == excluded)
    }
}
