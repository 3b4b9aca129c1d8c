//! AI collaborator port.
//!
//! Every call site that uses this trait has a deterministic fallback, so an
//! implementation may fail freely; callers degrade instead of propagating.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::record::{DirectoryAnalysisRecord, FileAnalysis};
use crate::config::AnalysisMode;
use crate::parser::ParsedFile;

use super::CollaboratorFuture;

/// Directory-level summary returned by [`AiCollaborator::enrich_directory`].
///
/// Empty fields mean "no opinion" and leave the heuristic value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryInsight {
    pub purpose: String,
    pub architecture: String,
    pub improvements: Vec<String>,
}

/// A parsed source file together with its name, as handed to the AI.
#[derive(Debug, Clone)]
pub struct ParsedSummary {
    pub path: String,
    pub parsed: ParsedFile,
}

pub trait AiCollaborator: Send + Sync {
    /// Capability gate checked before any other call.
    fn is_available(&self) -> bool;

    /// One-sentence description of a source file.
    fn enrich_file<'a>(
        &'a self,
        path: &'a Path,
        source: &'a str,
        parsed: &'a ParsedFile,
    ) -> CollaboratorFuture<'a, String>;

    fn enrich_directory<'a>(
        &'a self,
        path: &'a Path,
        files: &'a [FileAnalysis],
        parsed: &'a [ParsedSummary],
        mode: AnalysisMode,
    ) -> CollaboratorFuture<'a, DirectoryInsight>;

    fn suggest_improvements<'a>(
        &'a self,
        record: &'a DirectoryAnalysisRecord,
        mode: AnalysisMode,
    ) -> CollaboratorFuture<'a, Vec<String>>;
}
