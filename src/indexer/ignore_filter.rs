use std::path::{Component, Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{ContextError, Result};

/// Gitignore-style path filter built from the configured ignore patterns.
///
/// Patterns follow `.gitignore` precedence: a later `!pattern` re-includes a
/// path excluded by an earlier one, and a trailing `/` restricts a pattern to
/// directories.
#[derive(Clone)]
pub struct IgnoreFilter {
    root: PathBuf,
    matcher: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);

        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            builder
                .add_line(None, pattern)
                .map_err(|e| ContextError::Ignore(format!("{}: {}", pattern, e)))?;
        }

        let matcher = builder
            .build()
            .map_err(|e| ContextError::Ignore(e.to_string()))?;

        Ok(Self {
            root: root.to_path_buf(),
            matcher,
        })
    }

    /// A filter that includes everything.
    pub fn empty(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            matcher: Gitignore::empty(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify a path relative to the filter root.
    pub fn included(&self, relative: &Path, is_dir: bool) -> bool {
        let normalized = normalize(relative);
        if normalized.as_os_str().is_empty() {
            return true;
        }
        if normalized.has_root() {
            // Absolute paths outside the root are not ours to filter
            return true;
        }

        !self
            .matcher
            .matched_path_or_any_parents(&normalized, is_dir)
            .is_ignore()
    }

    /// Like [`IgnoreFilter::included`] but accepts a path under the root.
    pub fn included_path(&self, path: &Path, is_dir: bool) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(relative) => self.included(relative, is_dir),
            Err(_) if path.is_relative() => self.included(path, is_dir),
            Err(_) => true,
        }
    }
}

/// Normalize separators and drop `.` components so `./src\\lib` and
/// `src/lib` match the same patterns.
fn normalize(path: &Path) -> PathBuf {
    let unified = path.to_string_lossy().replace('\\', "/");
    Path::new(&unified)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
