//! Project configuration stored as `.dircontext.json` at the project root.
//!
//! The configuration is loaded once at the start of every command and passed
//! down explicitly; nothing in the library keeps it in global state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ContextError, Result};

/// Name of the configuration file
pub const CONFIG_FILENAME: &str = ".dircontext.json";

pub const CONFIG_VERSION: &str = "1.0.0";

pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules/",
    ".git/",
    "dist/",
    "build/",
    "target/",
    "coverage/",
    "*.log",
    ".DS_Store",
];

/// How much work an analysis pass is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Heuristics only, AI enrichment is never requested
    Quick,
    /// Per-file and per-directory AI enrichment when available
    #[default]
    Smart,
    /// Smart plus a dedicated improvement-suggestion pass
    Deep,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Quick => "quick",
            AnalysisMode::Smart => "smart",
            AnalysisMode::Deep => "deep",
        }
    }

    /// Whether this mode asks the AI collaborator for enrichment at all.
    pub fn uses_ai(&self) -> bool {
        !matches!(self, AnalysisMode::Quick)
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(AnalysisMode::Quick),
            "smart" => Ok(AnalysisMode::Smart),
            "deep" => Ok(AnalysisMode::Deep),
            other => Err(ContextError::Config(format!("unknown mode: {}", other))),
        }
    }
}

/// Output format used when a command prints an analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// External collaborators the user opted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Integrations {
    pub git: bool,
    pub claude: bool,
}

impl Default for Integrations {
    fn default() -> Self {
        Self {
            git: true,
            claude: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub version: String,
    pub mode: AnalysisMode,
    pub ignore_patterns: Vec<String>,
    pub analysis_focus: Vec<String>,
    pub output_format: OutputFormat,
    pub integrations: Integrations,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            mode: AnalysisMode::default(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            analysis_focus: vec![
                "architecture".to_string(),
                "dependencies".to_string(),
                "patterns".to_string(),
            ],
            output_format: OutputFormat::default(),
            integrations: Integrations::default(),
        }
    }
}

impl Configuration {
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(CONFIG_FILENAME)
    }

    pub fn exists(root: &Path) -> bool {
        Self::path_for(root).is_file()
    }

    /// Load the configuration for a project root.
    ///
    /// Returns [`ContextError::NotInitialized`] when the file is absent so the
    /// CLI can point the user at `init`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path_for(root);
        if !path.is_file() {
            return Err(ContextError::NotInitialized(root.to_path_buf()));
        }

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| ContextError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = Self::path_for(root);
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// Connection settings for the AI collaborator, read from the environment.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

pub const AGENT_ENDPOINT_ENV: &str = "DIRCONTEXT_AGENT_ENDPOINT";
pub const AGENT_MODEL_ENV: &str = "DIRCONTEXT_AGENT_MODEL";
pub const AGENT_API_KEY_ENV: &str = "DIRCONTEXT_AGENT_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_AGENT_ENDPOINT: &str = "https://api.anthropic.com/v1";
const DEFAULT_AGENT_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(60);

impl AgentSettings {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            endpoint: non_empty(AGENT_ENDPOINT_ENV)
                .unwrap_or_else(|| DEFAULT_AGENT_ENDPOINT.to_string()),
            model: non_empty(AGENT_MODEL_ENV).unwrap_or_else(|| DEFAULT_AGENT_MODEL.to_string()),
            api_key: non_empty(AGENT_API_KEY_ENV).or_else(|| non_empty(ANTHROPIC_API_KEY_ENV)),
            timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }
}
