use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::error::{ContextError, Result};

use super::CollaboratorFuture;

/// One entry of `git log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub date: String,
    pub message: String,
}

/// Version-control port. Outside a repository both calls resolve to an empty
/// list instead of an error.
pub trait VersionControl: Send + Sync {
    /// Absolute paths of files modified, created or renamed (destination)
    /// since the last commit.
    fn changed_files<'a>(&'a self, root: &'a Path) -> CollaboratorFuture<'a, Vec<PathBuf>>;

    /// Most recent commits of the repository rooted at `root`, newest first.
    fn recent_commits<'a>(
        &'a self,
        root: &'a Path,
        limit: usize,
    ) -> CollaboratorFuture<'a, Vec<CommitInfo>>;
}

/// `git` executable on PATH.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    async fn run(dir: &Path, args: &[&str]) -> Result<Option<String>> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ContextError::Git(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            debug!(
                "git {} failed in {}: {}",
                args.first().copied().unwrap_or_default(),
                dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

impl VersionControl for GitCli {
    fn changed_files<'a>(&'a self, root: &'a Path) -> CollaboratorFuture<'a, Vec<PathBuf>> {
        Box::pin(async move {
            let Some(top) = Self::run(root, &["rev-parse", "--show-toplevel"]).await? else {
                return Ok(Vec::new());
            };
            let top = PathBuf::from(top.trim());

            let Some(status) =
                Self::run(&top, &["status", "--porcelain", "--untracked-files=all"]).await?
            else {
                return Ok(Vec::new());
            };

            Ok(status
                .lines()
                .filter_map(parse_porcelain_line)
                .map(|relative| top.join(relative))
                .collect())
        })
    }

    fn recent_commits<'a>(
        &'a self,
        root: &'a Path,
        limit: usize,
    ) -> CollaboratorFuture<'a, Vec<CommitInfo>> {
        Box::pin(async move {
            let count = format!("-n{}", limit);
            let args = ["log", count.as_str(), "--date=short", "--format=%h%x1f%ad%x1f%s"];
            let Some(log) = Self::run(root, &args).await? else {
                return Ok(Vec::new());
            };

            Ok(log.lines().filter_map(parse_log_line).collect())
        })
    }
}

/// Used when git integration is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVersionControl;

impl VersionControl for NoVersionControl {
    fn changed_files<'a>(&'a self, _root: &'a Path) -> CollaboratorFuture<'a, Vec<PathBuf>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn recent_commits<'a>(
        &'a self,
        _root: &'a Path,
        _limit: usize,
    ) -> CollaboratorFuture<'a, Vec<CommitInfo>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// Nearest ancestor of `dir` (inclusive) that holds a `.git` entry.
pub fn find_repository_root(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|candidate| candidate.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Path reported by one `git status --porcelain` line, or `None` for
/// deletions and malformed lines.
pub(crate) fn parse_porcelain_line(line: &str) -> Option<PathBuf> {
    if line.len() < 4 {
        return None;
    }
    let (status, rest) = line.split_at(3);
    let status = status.trim();
    if status.contains('D') {
        return None;
    }

    let path = if status.contains('R') || status.contains('C') {
        rest.rsplit(" -> ").next()?
    } else {
        rest
    };

    let path = path.trim().trim_matches('"');
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

pub(crate) fn parse_log_line(line: &str) -> Option<CommitInfo> {
    let mut parts = line.splitn(3, '\u{1f}');
    let id = parts.next()?.trim();
    let date = parts.next()?.trim();
    let message = parts.next()?.trim();
    if id.is_empty() {
        return None;
    }
    Some(CommitInfo {
        id: id.to_string(),
        date: date.to_string(),
        message: message.to_string(),
    })
}
