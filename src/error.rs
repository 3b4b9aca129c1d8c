use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No configuration found in {0}. Run `dir-context init` first.")]
    NotInitialized(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid ignore pattern: {0}")]
    Ignore(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Watcher error: {0}")]
    Watcher(String),

    #[error("Path is outside the project root: {0}")]
    PathOutsideRoot(PathBuf),
}

pub type Result<T> = std::result::Result<T, ContextError>;
