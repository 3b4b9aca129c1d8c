//! Directory Analysis Record and the values embedded in it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::ParsedFile;

/// Sentinel `to` value of export edges: the symbol is visible outside the file.
pub const EXPORT_SENTINEL: &str = "<public>";

/// Number of files kept in [`DirectoryAnalysisRecord::key_files`].
pub const MAX_KEY_FILES: usize = 10;

/// Number of commits mapped into [`DirectoryAnalysisRecord::recent_changes`].
pub const MAX_RECENT_CHANGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    /// File name relative to the analyzed directory
    pub path: String,
    pub description: String,
    /// 0..=10, higher is more important
    pub importance: u8,
    /// At most three entries
    pub primary_functions: Vec<String>,
    /// Seconds since the Unix epoch, 0 when unknown
    pub last_modified: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Import of a relative module reference
    Import,
    /// Symbol exported by the file
    Export,
    /// Import of a package specifier
    External,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Import => "import",
            DependencyKind::Export => "export",
            DependencyKind::External => "external",
        }
    }
}

/// Directional, unresolved textual link. Edges are not de-duplicated across
/// files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub name: String,
    pub kind: DependencyKind,
    pub from: String,
    pub to: String,
}

impl DependencyEdge {
    /// Edges contributed by one parsed file: imports point from the module
    /// reference to the file, exports from the file to [`EXPORT_SENTINEL`].
    pub fn from_parsed(file: &str, parsed: &ParsedFile) -> Vec<DependencyEdge> {
        let imports = parsed.imports.iter().map(|import| DependencyEdge {
            name: if import.specifiers.is_empty() {
                import.source.clone()
            } else {
                import.specifiers.join(", ")
            },
            kind: if import.is_external() {
                DependencyKind::External
            } else {
                DependencyKind::Import
            },
            from: import.source.clone(),
            to: file.to_string(),
        });

        let exports = parsed.exports.iter().map(|export| DependencyEdge {
            name: export.name.clone(),
            kind: DependencyKind::Export,
            from: file.to_string(),
            to: EXPORT_SENTINEL.to_string(),
        });

        imports.chain(exports).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Abbreviated commit id
    pub commit: String,
    pub date: String,
    pub description: String,
    pub impact: String,
    /// File-level attribution is not collected yet and stays empty
    pub files: Vec<String>,
}

impl Change {
    pub fn new(commit: String, date: String, description: String) -> Self {
        let impact = Self::impact_for(&description).to_string();
        Self {
            commit,
            date,
            description,
            impact,
            files: Vec::new(),
        }
    }

    /// Classify a commit subject by its conventional-commit prefix.
    pub fn impact_for(message: &str) -> &'static str {
        let prefix = message
            .split(|c: char| c == ':' || c == '(' || c == '!')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        match prefix.as_str() {
            "feat" | "feature" => "New feature",
            "fix" | "bugfix" | "hotfix" => "Bug fix",
            "refactor" => "Refactoring",
            "docs" | "doc" => "Documentation",
            "test" | "tests" => "Tests",
            "perf" => "Performance",
            "chore" | "build" | "ci" | "style" => "Maintenance",
            _ => "General update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAnalysisRecord {
    pub path: PathBuf,
    pub purpose: String,
    pub architecture: String,
    /// Ranked by importance, descending, ties in input order
    pub key_files: Vec<FileAnalysis>,
    pub recent_changes: Vec<Change>,
    pub improvements: Vec<String>,
    pub dependencies: Vec<DependencyEdge>,
}

impl DirectoryAnalysisRecord {
    /// Name used as the document title.
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Stable descending sort by importance, keeping at most [`MAX_KEY_FILES`].
pub fn rank_key_files(mut files: Vec<FileAnalysis>) -> Vec<FileAnalysis> {
    // sort_by is stable, equal scores keep their input order
    files.sort_by(|a, b| b.importance.cmp(&a.importance));
    files.truncate(MAX_KEY_FILES);
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ExportDecl, ExportKind, ImportEdge, ImportKind};

    fn file(path: &str, importance: u8) -> FileAnalysis {
        FileAnalysis {
            path: path.to_string(),
            description: String::new(),
            importance,
            primary_functions: Vec::new(),
            last_modified: 0,
        }
    }

    #[test]
    fn test_rank_key_files_stable_descending() {
        let ranked = rank_key_files(vec![
            file("a.ts", 7),
            file("b.md", 5),
            file("index.ts", 10),
            file("c.ts", 7),
            file("a.test.ts", 3),
        ]);
        let names: Vec<_> = ranked.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(names, vec!["index.ts", "a.ts", "c.ts", "b.md", "a.test.ts"]);
    }

    #[test]
    fn test_rank_key_files_truncates() {
        let files = (0..15).map(|i| file(&format!("f{}.ts", i), 7)).collect();
        let ranked = rank_key_files(files);
        assert_eq!(ranked.len(), MAX_KEY_FILES);
        assert_eq!(ranked[0].path, "f0.ts");
        assert_eq!(ranked[9].path, "f9.ts");
    }

    #[test]
    fn test_dependency_edges_from_parsed() {
        let parsed = ParsedFile {
            imports: vec![
                ImportEdge {
                    source: "react".to_string(),
                    specifiers: vec!["React".to_string()],
                    kind: ImportKind::Default,
                },
                ImportEdge {
                    source: "./helpers".to_string(),
                    specifiers: vec!["a".to_string(), "b".to_string()],
                    kind: ImportKind::Named,
                },
            ],
            exports: vec![ExportDecl {
                name: "run".to_string(),
                kind: ExportKind::Function,
                is_default: false,
            }],
            ..Default::default()
        };

        let edges = DependencyEdge::from_parsed("index.ts", &parsed);
        assert_eq!(edges.len(), 3);

        assert_eq!(edges[0].kind, DependencyKind::External);
        assert_eq!(edges[0].from, "react");
        assert_eq!(edges[0].to, "index.ts");

        assert_eq!(edges[1].kind, DependencyKind::Import);
        assert_eq!(edges[1].name, "a, b");

        assert_eq!(edges[2].kind, DependencyKind::Export);
        assert_eq!(edges[2].from, "index.ts");
        assert_eq!(edges[2].to, EXPORT_SENTINEL);
    }

    #[test]
    fn test_change_impact_for() {
        assert_eq!(Change::impact_for("feat: add login"), "New feature");
        assert_eq!(Change::impact_for("fix(parser): handle braces"), "Bug fix");
        assert_eq!(Change::impact_for("refactor!: rename module"), "Refactoring");
        assert_eq!(Change::impact_for("chore: bump deps"), "Maintenance");
        assert_eq!(Change::impact_for("Update README"), "General update");
    }

    #[test]
    fn test_change_files_empty() {
        let change = Change::new("abc1234".into(), "2024-01-01".into(), "docs: x".into());
        assert!(change.files.is_empty());
        assert_eq!(change.impact, "Documentation");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/project/src/utils")), "utils");
    }
}
