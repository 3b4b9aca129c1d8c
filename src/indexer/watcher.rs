use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};

use crate::error::{ContextError, Result};

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Debounced recursive watcher over a project root.
pub struct ChangeWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    receiver: Receiver<std::result::Result<Vec<DebouncedEvent>, notify::Error>>,
}

impl ChangeWatcher {
    pub fn new(root: &Path) -> Result<Self> {
        let (tx, rx) = channel();

        let mut debouncer = new_debouncer(DEBOUNCE_WINDOW, tx)
            .map_err(|e| ContextError::Watcher(e.to_string()))?;

        debouncer
            .watcher()
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| ContextError::Watcher(e.to_string()))?;

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
        })
    }

    /// Wait up to `timeout` for the next batch of changed paths. An elapsed
    /// timeout yields an empty batch.
    ///
    /// Returns `Ok(None)` once the watcher has shut down.
    pub fn next_batch(&self, timeout: Duration) -> Result<Option<Vec<PathBuf>>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(events) => Self::paths(events).map(Some),
            Err(RecvTimeoutError::Timeout) => Ok(Some(Vec::new())),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    fn paths(
        events: std::result::Result<Vec<DebouncedEvent>, notify::Error>,
    ) -> Result<Vec<PathBuf>> {
        let events = events.map_err(|e| ContextError::Watcher(e.to_string()))?;
        let mut paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_watcher_reports_written_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        let watcher = ChangeWatcher::new(&root).unwrap();

        std::fs::write(root.join("index.ts"), "export {}").unwrap();

        let mut seen = Vec::new();
        for _ in 0..10 {
            let batch = watcher.next_batch(Duration::from_secs(1)).unwrap().unwrap();
            seen.extend(batch);
            if !seen.is_empty() {
                break;
            }
        }
        assert!(seen
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == "index.ts")));
    }

    #[test]
    fn test_quiet_tree_yields_empty_batch() {
        let temp_dir = TempDir::new().unwrap();
        let watcher = ChangeWatcher::new(temp_dir.path()).unwrap();
        let batch = watcher.next_batch(Duration::from_millis(50)).unwrap();
        assert_eq!(batch, Some(Vec::new()));
    }

    #[test]
    fn test_watcher_missing_root_fails() {
        let result = ChangeWatcher::new(Path::new("/nonexistent/dir-context/watch"));
        assert!(matches!(result, Err(ContextError::Watcher(_))));
    }
}
