//! Live AI collaborator backed by [`AgentClient`].

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::analysis::record::{DirectoryAnalysisRecord, FileAnalysis};
use crate::config::{AgentSettings, AnalysisMode};
use crate::error::{ContextError, Result};
use crate::parser::ParsedFile;

use super::agent_client::{AgentClient, AgentMessage};
use super::ai::{AiCollaborator, DirectoryInsight, ParsedSummary};
use super::CollaboratorFuture;

/// Source text beyond this many characters is not sent.
const MAX_SOURCE_CHARS: usize = 6000;
const FILE_MAX_TOKENS: u32 = 120;
const DIRECTORY_MAX_TOKENS: u32 = 800;

pub struct AgentCollaborator {
    client: AgentClient,
    enabled: bool,
}

impl AgentCollaborator {
    /// `enabled` mirrors `integrations.claude`; the collaborator is only
    /// available when it is set and an API key is configured.
    pub fn new(settings: AgentSettings, enabled: bool) -> Result<Self> {
        Ok(Self {
            client: AgentClient::new(settings)?,
            enabled,
        })
    }

    async fn describe_file(&self, path: &Path, source: &str, parsed: &ParsedFile) -> Result<String> {
        let summary = serde_json::to_string(parsed)?;
        let user = format!(
            "File: {}\nStructure: {}\n\nSource:\n{}",
            path.display(),
            summary,
            truncate_chars(source, MAX_SOURCE_CHARS)
        );

        let content = self
            .client
            .complete(
                &[AgentMessage::system(FILE_PROMPT), AgentMessage::user(user)],
                FILE_MAX_TOKENS,
            )
            .await?;

        first_line(&content)
            .ok_or_else(|| ContextError::Agent("empty file description from agent".to_string()))
    }

    async fn describe_directory(
        &self,
        path: &Path,
        files: &[FileAnalysis],
        parsed: &[ParsedSummary],
        mode: AnalysisMode,
    ) -> Result<DirectoryInsight> {
        let payload = serde_json::json!({
            "directory": path.display().to_string(),
            "depth": mode.as_str(),
            "files": files.iter().map(|f| serde_json::json!({
                "path": f.path,
                "description": f.description,
                "importance": f.importance,
            })).collect::<Vec<_>>(),
            "parsed": parsed.iter().map(|p| serde_json::json!({
                "path": p.path,
                "purpose": p.parsed.main_purpose,
                "exports": p.parsed.exports.iter().map(|e| &e.name).collect::<Vec<_>>(),
                "imports": p.parsed.imports.iter().map(|i| &i.source).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        });

        let content = self
            .client
            .complete(
                &[
                    AgentMessage::system(DIRECTORY_PROMPT),
                    AgentMessage::user(serde_json::to_string_pretty(&payload)?),
                ],
                DIRECTORY_MAX_TOKENS,
            )
            .await?;

        parse_json_object::<DirectoryInsight>(&content)
    }

    async fn improvements_for(
        &self,
        record: &DirectoryAnalysisRecord,
        mode: AnalysisMode,
    ) -> Result<Vec<String>> {
        let payload = serde_json::json!({
            "depth": mode.as_str(),
            "record": record,
        });

        let content = self
            .client
            .complete(
                &[
                    AgentMessage::system(IMPROVEMENTS_PROMPT),
                    AgentMessage::user(serde_json::to_string_pretty(&payload)?),
                ],
                DIRECTORY_MAX_TOKENS,
            )
            .await?;

        let parsed = parse_json_object::<ImprovementList>(&content)?;
        Ok(parsed
            .improvements
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

impl AiCollaborator for AgentCollaborator {
    fn is_available(&self) -> bool {
        self.enabled && self.client.has_api_key()
    }

    fn enrich_file<'a>(
        &'a self,
        path: &'a Path,
        source: &'a str,
        parsed: &'a ParsedFile,
    ) -> CollaboratorFuture<'a, String> {
        Box::pin(self.describe_file(path, source, parsed))
    }

    fn enrich_directory<'a>(
        &'a self,
        path: &'a Path,
        files: &'a [FileAnalysis],
        parsed: &'a [ParsedSummary],
        mode: AnalysisMode,
    ) -> CollaboratorFuture<'a, DirectoryInsight> {
        Box::pin(self.describe_directory(path, files, parsed, mode))
    }

    fn suggest_improvements<'a>(
        &'a self,
        record: &'a DirectoryAnalysisRecord,
        mode: AnalysisMode,
    ) -> CollaboratorFuture<'a, Vec<String>> {
        Box::pin(self.improvements_for(record, mode))
    }
}

const FILE_PROMPT: &str = "You document source files for developers.\n\
Reply with exactly one sentence describing what the file is responsible for.\n\
No markdown, no preamble.";

const DIRECTORY_PROMPT: &str = "You document source directories for developers.\n\
Return strictly one JSON object only (no markdown) with shape:\n\
{\"purpose\": \"one sentence\", \"architecture\": \"two or three sentences\", \"improvements\": [\"...\"]}\n\
Rules:\n\
- Base every statement on the files provided.\n\
- Use an empty string or empty list when unsure.\n\
- With depth \"deep\" include up to five concrete improvements, otherwise up to three.";

const IMPROVEMENTS_PROMPT: &str = "You review source directories for maintainability.\n\
Return strictly one JSON object only (no markdown) with shape:\n\
{\"improvements\": [\"...\"]}\n\
Each improvement is one actionable sentence grounded in the analysis record provided.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImprovementList {
    improvements: Vec<String>,
}

fn parse_json_object<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    if let Ok(value) = serde_json::from_str::<T>(content) {
        return Ok(value);
    }

    let extracted = extract_json_object(content).ok_or_else(|| {
        ContextError::Agent(format!(
            "agent response is not a JSON object: {}",
            truncate_chars(content.trim(), 240)
        ))
    })?;

    serde_json::from_str::<T>(extracted).map_err(|e| {
        debug!("agent payload rejected: {}", extracted);
        ContextError::Agent(format!("agent JSON parse error: {}", e))
    })
}

fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    content.get(start..=end)
}

fn first_line(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_matches('"').to_string())
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
