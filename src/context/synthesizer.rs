//! Context Synthesizer: assembles persisted documents and file trees into a
//! single text view.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use walkdir::WalkDir;

use crate::document::{self, DOCUMENT_FILENAME};
use crate::error::{ContextError, Result};

use super::tree::render_tree;

const DIRECTORY_TREE_DEPTH: usize = 2;
const PROJECT_TREE_DEPTH: usize = 1;
const PROJECT_DOCUMENT_LIMIT: usize = 10;
const PROJECT_DOCUMENT_LINES: usize = 10;
const PARENT_DOCUMENT_LINES: usize = 20;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextView {
    /// Target document plus a depth-2 tree
    Directory,
    /// Root tree plus excerpts of the first documents found
    Project,
    /// Target document plus an excerpt of the parent's
    #[default]
    Standard,
}

impl ContextView {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextView::Directory => "directory",
            ContextView::Project => "project",
            ContextView::Standard => "standard",
        }
    }
}

impl fmt::Display for ContextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextView {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "directory" | "dir" => Ok(ContextView::Directory),
            "project" => Ok(ContextView::Project),
            "standard" => Ok(ContextView::Standard),
            other => Err(ContextError::Config(format!("unknown context view: {}", other))),
        }
    }
}

pub struct ContextSynthesizer {
    root: PathBuf,
}

impl ContextSynthesizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn synthesize(&self, target: &Path, view: ContextView) -> Result<String> {
        match view {
            ContextView::Directory => self.directory_view(target),
            ContextView::Project => self.project_view(),
            ContextView::Standard => self.standard_view(target),
        }
    }

    fn directory_view(&self, target: &Path) -> Result<String> {
        let mut out = match document::read(target)? {
            Some(text) => text,
            None => missing_notice(target),
        };
        ensure_newline(&mut out);

        out.push_str("\n## File Tree\n\n```\n");
        out.push_str(&render_tree(target, DIRECTORY_TREE_DEPTH));
        out.push_str("```\n");
        Ok(out)
    }

    fn project_view(&self) -> Result<String> {
        let mut out = String::from("# Project Structure\n\n```\n");
        out.push_str(&render_tree(&self.root, PROJECT_TREE_DEPTH));
        out.push_str("```\n");

        for dir in self.document_dirs() {
            let Some(text) = document::read(&dir)? else {
                continue;
            };
            out.push_str(&format!("\n## {}\n\n", self.relative_name(&dir)));
            out.push_str(&excerpt(&text, PROJECT_DOCUMENT_LINES));
        }

        Ok(out)
    }

    fn standard_view(&self, target: &Path) -> Result<String> {
        let mut out = match document::read(target)? {
            Some(text) => text,
            None => missing_notice(target),
        };
        ensure_newline(&mut out);

        let Some(parent) = self.parent_within_root(target) else {
            return Ok(out);
        };

        if let Some(text) = document::read(&parent)? {
            out.push_str(&format!(
                "\n## Parent Context ({})\n\n",
                self.relative_name(&parent)
            ));
            out.push_str(&excerpt(&text, PARENT_DOCUMENT_LINES));
        }

        Ok(out)
    }

    /// Up to [`PROJECT_DOCUMENT_LIMIT`] directories with a document, depth first.
    fn document_dirs(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_dir() {
                    !name.starts_with('.') && name != "node_modules"
                } else {
                    name == DOCUMENT_FILENAME
                }
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
            .take(PROJECT_DOCUMENT_LIMIT)
            .collect()
    }

    fn parent_within_root(&self, target: &Path) -> Option<PathBuf> {
        let root = self.root.canonicalize().ok()?;
        let target = target.canonicalize().ok()?;
        if target == root {
            return None;
        }
        let parent = target.parent()?;
        if !parent.starts_with(&root) {
            return None;
        }
        let relative = parent.strip_prefix(&root).ok()?;
        if relative.as_os_str().is_empty() {
            Some(self.root.clone())
        } else {
            Some(self.root.join(relative))
        }
    }

    fn relative_name(&self, dir: &Path) -> String {
        match dir.strip_prefix(&self.root) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
            Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
            Err(_) => dir.display().to_string(),
        }
    }
}

fn missing_notice(target: &Path) -> String {
    format!(
        "No documentation found for {}. Run `dir-context refresh --path {}` to generate it.\n",
        target.display(),
        target.display()
    )
}

/// First `limit` lines of `text`, followed by an ellipsis line when anything
/// was cut.
fn excerpt(text: &str, limit: usize) -> String {
    let mut lines = text.lines();
    let mut out: String = lines
        .by_ref()
        .take(limit)
        .map(|line| format!("{}\n", line))
        .collect();
    if lines.next().is_some() {
        out.push_str(ELLIPSIS);
        out.push('\n');
    }
    out
}

fn ensure_newline(text: &mut String) {
    if !text.ends_with('\n') {
        text.push('\n');
    }
}
