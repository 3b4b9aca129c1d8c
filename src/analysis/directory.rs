//! Directory Analyzer: one directory's immediate files in, one
//! [`DirectoryAnalysisRecord`] out.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rayon::prelude::*;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::collaborators::{
    find_repository_root, soft_call, AiCollaborator, Collaborators, ParsedSummary, AI_TIMEOUT,
    GIT_TIMEOUT,
};
use crate::config::{AnalysisMode, Configuration};
use crate::document;
use crate::error::Result;
use crate::indexer::ignore_filter::IgnoreFilter;
use crate::indexer::walker::is_hidden;
use crate::parser::{ParsedFile, SourceAnalyzer};

use super::describer::{extension, is_test_file, FileDescriber, SOURCE_EXTENSIONS};
use super::record::{
    rank_key_files, Change, DependencyEdge, DirectoryAnalysisRecord, FileAnalysis,
    MAX_RECENT_CHANGES,
};

const MAX_PARSED_FUNCTIONS: usize = 3;
/// In-flight per-file AI requests for one directory.
const MAX_CONCURRENT_ENRICHMENTS: usize = 4;
const MAX_EXTERNAL_SOURCES: usize = 3;
const README_THRESHOLD: usize = 5;

const NAMED_DIRECTORIES: &[(&str, &str)] = &[
    ("src", "Main source code directory"),
    ("lib", "Shared library code"),
    ("components", "Reusable UI components"),
    ("utils", "Utility functions and helper modules"),
    ("util", "Utility functions and helper modules"),
    ("helpers", "Utility functions and helper modules"),
    ("api", "API endpoints and client code"),
    ("services", "Business logic and service layer"),
    ("models", "Data models and schemas"),
    ("hooks", "Custom React hooks"),
    ("pages", "Page-level components and routes"),
    ("routes", "Route definitions and handlers"),
    ("middleware", "Request middleware"),
    ("store", "Application state management"),
    ("types", "Shared type definitions"),
    ("config", "Configuration files"),
    ("tests", "Test suites"),
    ("test", "Test suites"),
    ("__tests__", "Test suites"),
    ("styles", "Stylesheets"),
    ("assets", "Static assets"),
    ("public", "Publicly served static assets"),
    ("scripts", "Build and maintenance scripts"),
    ("docs", "Project documentation"),
];

const EXTENSION_PURPOSES: &[(&str, &str)] = &[
    ("ts", "Contains TypeScript modules"),
    ("tsx", "Contains TypeScript React components"),
    ("js", "Contains JavaScript modules"),
    ("jsx", "Contains JavaScript React components"),
    ("mjs", "Contains JavaScript modules"),
    ("cjs", "Contains JavaScript modules"),
    ("py", "Contains Python modules"),
    ("rs", "Contains Rust modules"),
    ("go", "Contains Go source files"),
    ("java", "Contains Java classes"),
    ("md", "Contains documentation"),
    ("json", "Contains configuration and data files"),
    ("yml", "Contains configuration files"),
    ("yaml", "Contains configuration files"),
    ("css", "Contains stylesheets"),
    ("scss", "Contains stylesheets"),
    ("html", "Contains HTML pages"),
    ("sh", "Contains shell scripts"),
    ("sql", "Contains SQL scripts"),
];

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

/// Output of the per-file describe+parse step.
struct InspectedFile {
    path: PathBuf,
    analysis: FileAnalysis,
    parsed: Option<ParsedFile>,
    source: Option<String>,
}

pub struct DirectoryAnalyzer {
    config: Configuration,
    filter: IgnoreFilter,
    collaborators: Collaborators,
    ai_timeout: Duration,
    git_timeout: Duration,
}

impl DirectoryAnalyzer {
    pub fn new(config: Configuration, filter: IgnoreFilter, collaborators: Collaborators) -> Self {
        Self {
            config,
            filter,
            collaborators,
            ai_timeout: AI_TIMEOUT,
            git_timeout: GIT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, ai: Duration, git: Duration) -> Self {
        self.ai_timeout = ai;
        self.git_timeout = git;
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn filter(&self) -> &IgnoreFilter {
        &self.filter
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Analyze `dir` and persist its document.
    pub async fn analyze(&self, dir: &Path) -> Result<DirectoryAnalysisRecord> {
        let record = self.build_record(dir).await?;
        document::write(&record)?;
        info!("Analyzed {}", dir.display());
        Ok(record)
    }

    /// Analyze `dir` without writing anything.
    ///
    /// Only a failure to list the directory itself is returned as an error;
    /// unreadable files and collaborator failures degrade the result.
    pub async fn build_record(&self, dir: &Path) -> Result<DirectoryAnalysisRecord> {
        let mode = self.config.mode;
        let ai = self
            .collaborators
            .available_ai()
            .filter(|_| mode.uses_ai());

        let files = self.list_files(dir)?;
        debug!("{}: {} files", dir.display(), files.len());

        let inspected: Vec<InspectedFile> = files.par_iter().map(|path| inspect(path)).collect();

        let mut ai_descriptions = match ai {
            Some(ai) => self.describe_with_ai(ai, &inspected).await,
            None => vec![None; inspected.len()],
        };

        let mut analyses = Vec::with_capacity(inspected.len());
        let mut summaries = Vec::new();
        let mut dependencies = Vec::new();

        for (index, file) in inspected.into_iter().enumerate() {
            let InspectedFile {
                mut analysis,
                parsed,
                ..
            } = file;

            if let Some(parsed) = parsed {
                analysis.description = ai_descriptions[index]
                    .take()
                    .unwrap_or_else(|| parsed.main_purpose.clone());

                let signatures: Vec<String> = parsed
                    .exported_functions()
                    .take(MAX_PARSED_FUNCTIONS)
                    .map(|f| f.signature())
                    .collect();
                if !signatures.is_empty() {
                    analysis.primary_functions = signatures;
                }

                dependencies.extend(DependencyEdge::from_parsed(&analysis.path, &parsed));
                summaries.push(ParsedSummary {
                    path: analysis.path.clone(),
                    parsed,
                });
            }

            analyses.push(analysis);
        }

        let recent_changes = self.recent_changes(dir).await;

        let mut purpose = directory_purpose(dir, &analyses);
        let mut architecture = architecture_insight(&analyses, &summaries);
        let mut improvements = improvement_suggestions(&analyses);

        if let Some(ai) = ai {
            let insight = soft_call(
                "AI directory enrichment",
                self.ai_timeout,
                ai.enrich_directory(dir, &analyses, &summaries, mode),
            )
            .await;

            if let Some(insight) = insight {
                if !insight.purpose.trim().is_empty() {
                    purpose = insight.purpose.trim().to_string();
                }
                if !insight.architecture.trim().is_empty() {
                    architecture = insight.architecture.trim().to_string();
                }
                if !insight.improvements.is_empty() {
                    improvements = insight.improvements;
                }
            }
        }

        let mut record = DirectoryAnalysisRecord {
            path: dir.to_path_buf(),
            purpose,
            architecture,
            key_files: rank_key_files(analyses),
            recent_changes,
            improvements,
            dependencies,
        };

        if let (Some(ai), AnalysisMode::Deep) = (ai, mode) {
            let suggestions = soft_call(
                "AI improvement suggestions",
                self.ai_timeout,
                ai.suggest_improvements(&record, mode),
            )
            .await;
            if let Some(suggestions) = suggestions.filter(|s| !s.is_empty()) {
                record.improvements = suggestions;
            }
        }

        Ok(record)
    }

    /// Regular files directly inside `dir` that survive the dotfile and
    /// ignore rules, sorted by path.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if is_hidden(&entry.file_name()) {
                continue;
            }

            let path = entry.path();
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            }

            if self.filter.included_path(&path, false) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// AI descriptions for the parsed files, index-aligned with `files`.
    ///
    /// Requests run a few at a time under one budget for the whole
    /// directory. Files still pending when the budget runs out keep their
    /// structural purpose.
    async fn describe_with_ai(
        &self,
        ai: &dyn AiCollaborator,
        files: &[InspectedFile],
    ) -> Vec<Option<String>> {
        let mut descriptions = vec![None; files.len()];

        let requests = files.iter().enumerate().filter_map(move |(index, file)| {
            let parsed = file.parsed.as_ref()?;
            let source = file.source.as_deref().unwrap_or_default();
            Some(async move { (index, ai.enrich_file(&file.path, source, parsed).await) })
        });
        let mut pending = stream::iter(requests).buffer_unordered(MAX_CONCURRENT_ENRICHMENTS);

        let deadline = Instant::now() + self.ai_timeout;
        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((index, Ok(text)))) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        descriptions[index] = Some(text.to_string());
                    }
                }
                Ok(Some((index, Err(e)))) => {
                    warn!(
                        "AI file enrichment failed for {}: {}",
                        files[index].path.display(),
                        e
                    );
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "AI file enrichment timed out after {:?}; remaining files keep heuristic descriptions",
                        self.ai_timeout
                    );
                    break;
                }
            }
        }

        descriptions
    }

    /// Latest commits of the repository that owns `dir`.
    async fn recent_changes(&self, dir: &Path) -> Vec<Change> {
        let Some(repository) = find_repository_root(dir) else {
            debug!("{} is not under version control", dir.display());
            return Vec::new();
        };

        soft_call(
            "Version control history",
            self.git_timeout,
            self.collaborators
                .vcs
                .recent_commits(&repository, MAX_RECENT_CHANGES),
        )
        .await
        .unwrap_or_default()
        .into_iter()
        .take(MAX_RECENT_CHANGES)
        .map(|c| Change::new(c.id, c.date, c.message))
        .collect()
    }
}

fn inspect(path: &Path) -> InspectedFile {
    let analysis = FileDescriber::describe(path);

    if !SourceAnalyzer::is_parseable(path) {
        return InspectedFile {
            path: path.to_path_buf(),
            analysis,
            parsed: None,
            source: None,
        };
    }

    match fs::read_to_string(path) {
        Ok(source) => InspectedFile {
            path: path.to_path_buf(),
            analysis,
            parsed: SourceAnalyzer::analyze(path, &source),
            source: Some(source),
        },
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            InspectedFile {
                path: path.to_path_buf(),
                analysis,
                parsed: None,
                source: None,
            }
        }
    }
}

fn directory_purpose(dir: &Path, files: &[FileAnalysis]) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if let Some((_, purpose)) = NAMED_DIRECTORIES.iter().find(|(known, _)| *known == name) {
        return purpose.to_string();
    }

    dominant_extension(files)
        .and_then(|(ext, _)| {
            EXTENSION_PURPOSES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, purpose)| purpose.to_string())
        })
        .unwrap_or_else(|| format!("Directory containing {} files", files.len()))
}

fn architecture_insight(files: &[FileAnalysis], parsed: &[ParsedSummary]) -> String {
    let Some((ext, count)) = dominant_extension(files) else {
        return "No source files to analyze.".to_string();
    };

    let mut sentences = vec![format!(
        "Primarily .{} files ({} of {}).",
        ext,
        count,
        files.len()
    )];

    let mut external: Vec<&str> = Vec::new();
    for import in parsed.iter().flat_map(|p| p.parsed.imports.iter()) {
        if external.len() == MAX_EXTERNAL_SOURCES {
            break;
        }
        if import.is_external() && !external.contains(&import.source.as_str()) {
            external.push(&import.source);
        }
    }
    if !external.is_empty() {
        sentences.push(format!("External dependencies: {}.", external.join(", ")));
    }

    if files.iter().any(|f| is_test_file(&f.path)) {
        sentences.push("Includes tests.".to_string());
    }
    if files.iter().any(|f| is_type_definition(&f.path)) {
        sentences.push("Includes type definitions.".to_string());
    }

    sentences.join(" ")
}

fn improvement_suggestions(files: &[FileAnalysis]) -> Vec<String> {
    let mut improvements = Vec::new();

    let has_tests = files.iter().any(|f| is_test_file(&f.path));
    let has_source = files.iter().any(|f| {
        !is_test_file(&f.path)
            && extension(&f.path).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
    });
    if has_source && !has_tests {
        improvements.push("Add unit tests for the source files in this directory".to_string());
    }

    let has_readme = files
        .iter()
        .any(|f| f.path.to_lowercase().starts_with("readme"));
    if files.len() > README_THRESHOLD && !has_readme {
        improvements.push("Add a README describing this directory".to_string());
    }

    let has_scripts = files
        .iter()
        .any(|f| extension(&f.path).is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext.as_str())));
    let has_types = files.iter().any(|f| is_type_definition(&f.path));
    if has_scripts && !has_types {
        improvements.push("Add type definitions (.d.ts) for the JavaScript modules".to_string());
    }

    improvements
}

/// Most frequent extension among `files`, ties broken alphabetically.
fn dominant_extension(files: &[FileAnalysis]) -> Option<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for ext in files.iter().filter_map(|f| extension(&f.path)) {
        *counts.entry(ext).or_default() += 1;
    }

    // max_by_key keeps the last maximum; iterate in reverse so the
    // alphabetically first extension wins
    counts.into_iter().rev().max_by_key(|(_, count)| *count)
}

fn is_type_definition(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".d.ts") || lower == "types.ts"
}
