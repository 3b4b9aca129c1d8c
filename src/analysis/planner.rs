//! Change-Aware Refresh Planner: which directories a refresh should analyze.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::collaborators::{soft_call, VersionControl, GIT_TIMEOUT};
use crate::error::{ContextError, Result};
use crate::indexer::ignore_filter::IgnoreFilter;
use crate::indexer::walker::ProjectWalker;

/// What a refresh covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshScope {
    /// Parent directories of files changed since the last commit
    Changed,
    /// Every directory the walker yields
    All,
    /// Exactly one directory
    Path(PathBuf),
}

pub struct RefreshPlanner<'a> {
    root: &'a Path,
    filter: &'a IgnoreFilter,
    vcs: &'a dyn VersionControl,
    git_timeout: Duration,
}

impl<'a> RefreshPlanner<'a> {
    pub fn new(root: &'a Path, filter: &'a IgnoreFilter, vcs: &'a dyn VersionControl) -> Self {
        Self {
            root,
            filter,
            vcs,
            git_timeout: GIT_TIMEOUT,
        }
    }

    /// Directories holding files modified, created or renamed since the last
    /// commit. Empty when nothing changed or version control is unavailable.
    pub async fn plan(&self) -> BTreeSet<PathBuf> {
        let changed = soft_call(
            "Version control status",
            self.git_timeout,
            self.vcs.changed_files(self.root),
        )
        .await
        .unwrap_or_default();

        debug!("{} changed files reported", changed.len());
        affected_directories(self.root, self.filter, changed)
    }

    /// Directory set for `scope`; explicit scopes bypass version control.
    pub async fn resolve(&self, scope: &RefreshScope) -> Result<BTreeSet<PathBuf>> {
        match scope {
            RefreshScope::Changed => Ok(self.plan().await),
            RefreshScope::All => Ok(ProjectWalker::new(self.filter)
                .walk(self.root)
                .into_iter()
                .collect()),
            RefreshScope::Path(path) => {
                let mut dirs = BTreeSet::new();
                dirs.insert(resolve_target(self.root, path)?);
                Ok(dirs)
            }
        }
    }
}

/// Resolve `path` (relative paths are taken from `root`) to a directory
/// inside the project.
pub fn resolve_target(root: &Path, path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let canonical_root = root.canonicalize()?;
    let canonical = joined.canonicalize()?;

    let relative = canonical
        .strip_prefix(&canonical_root)
        .map_err(|_| ContextError::PathOutsideRoot(joined.clone()))?;

    if !canonical.is_dir() {
        return Err(ContextError::Config(format!(
            "{} is not a directory",
            joined.display()
        )));
    }

    Ok(if relative.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    })
}

/// Parent directories of `paths` that belong to the project and should get a
/// document.
///
/// Files and directories outside `root`, under a dot-directory, rejected by
/// the ignore filter, or no longer on disk are dropped. Dotfiles themselves,
/// including persisted documents, never contribute.
pub fn affected_directories<I>(root: &Path, filter: &IgnoreFilter, paths: I) -> BTreeSet<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let canonical_root = root.canonicalize().ok();
    let mut dirs = BTreeSet::new();

    for path in paths {
        let relative = match path.strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => match canonical_root
                .as_deref()
                .and_then(|canonical| path.strip_prefix(canonical).ok())
            {
                Some(relative) => relative.to_path_buf(),
                None => {
                    debug!("Ignoring change outside project: {}", path.display());
                    continue;
                }
            },
        };

        if has_dot_segment(&relative) {
            continue;
        }
        if !filter.included(&relative, false) {
            continue;
        }

        let dir_relative = relative.parent().unwrap_or(Path::new(""));
        if !filter.included(dir_relative, true) {
            continue;
        }

        let dir = if dir_relative.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(dir_relative)
        };
        if !dir.is_dir() {
            continue;
        }

        dirs.insert(dir);
    }

    dirs
}

fn has_dot_segment(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        Component::ParentDir => true,
        _ => false,
    })
}
