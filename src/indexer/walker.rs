use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ignore_filter::IgnoreFilter;

/// Enumerates every directory of a project that should get a document.
pub struct ProjectWalker<'a> {
    filter: &'a IgnoreFilter,
}

impl<'a> ProjectWalker<'a> {
    pub fn new(filter: &'a IgnoreFilter) -> Self {
        Self { filter }
    }

    /// Depth-first list of directories under `root`, the root included.
    ///
    /// Dot-directories and anything the ignore filter rejects (relative to
    /// `root`) are pruned together with their subtrees. Symlinked directories
    /// are followed, but a directory reached twice through different links is
    /// only yielded once.
    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut dirs = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if !entry.file_type().is_dir() {
                    return false;
                }
                if is_hidden(entry.file_name()) {
                    return false;
                }
                let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
                self.filter.included(relative, true)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Unreadable directories and symlink loops are skipped
                    tracing::warn!("Skipping directory: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let canonical = entry
                .path()
                .canonicalize()
                .unwrap_or_else(|_| entry.path().to_path_buf());
            if !visited.insert(canonical) {
                tracing::debug!("Already visited {}", entry.path().display());
                continue;
            }

            dirs.push(entry.into_path());
        }

        dirs
    }
}

pub(crate) fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
