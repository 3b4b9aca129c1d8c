//! Persisted per-directory Markdown document.
//!
//! Sections are rendered top-down with the most salient content first, since
//! context views keep only the first lines of a document. Nothing
//! time-dependent is rendered, so re-analysis of unchanged input is
//! byte-identical.

use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::analysis::record::DirectoryAnalysisRecord;
use crate::error::Result;

pub const DOCUMENT_FILENAME: &str = ".context.md";

const TEMP_SUFFIX: &str = ".tmp";

static KEY_FILE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\. `([^`]+)` \(importance (\d+)\)").expect("valid key file regex")
});

pub fn document_path(dir: &Path) -> PathBuf {
    dir.join(DOCUMENT_FILENAME)
}

pub fn render(record: &DirectoryAnalysisRecord) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "# {}\n", record.display_name());

    let _ = writeln!(out, "## Purpose\n\n{}\n", record.purpose);
    let _ = writeln!(out, "## Architecture\n\n{}\n", record.architecture);

    out.push_str("## Key Files\n\n");
    if record.key_files.is_empty() {
        out.push_str("No files analyzed.\n");
    }
    for (i, file) in record.key_files.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. `{}` (importance {}) - {}",
            i + 1,
            file.path,
            file.importance,
            file.description
        );
        if !file.primary_functions.is_empty() {
            let _ = writeln!(out, "   - Functions: {}", file.primary_functions.join(", "));
        }
    }
    out.push('\n');

    out.push_str("## Recent Changes\n\n");
    if record.recent_changes.is_empty() {
        out.push_str("No recent changes recorded.\n");
    }
    for change in &record.recent_changes {
        let _ = writeln!(
            out,
            "- `{}` ({}) {} [{}]",
            change.commit, change.date, change.description, change.impact
        );
    }
    out.push('\n');

    out.push_str("## Improvement Suggestions\n\n");
    if record.improvements.is_empty() {
        out.push_str("No suggestions.\n");
    }
    for improvement in &record.improvements {
        let _ = writeln!(out, "- {}", improvement);
    }
    out.push('\n');

    out.push_str("## Dependencies\n\n");
    if record.dependencies.is_empty() {
        out.push_str("No dependencies detected.\n");
    }
    for edge in &record.dependencies {
        let _ = writeln!(
            out,
            "- {} `{}`: `{}` -> `{}`",
            edge.kind.as_str(),
            edge.name,
            edge.from,
            edge.to
        );
    }

    out
}

/// Render and persist the document inside `record.path`, replacing any
/// previous version atomically.
pub fn write(record: &DirectoryAnalysisRecord) -> Result<PathBuf> {
    let target = document_path(&record.path);
    let temp = record
        .path
        .join(format!("{}{}", DOCUMENT_FILENAME, TEMP_SUFFIX));

    fs::write(&temp, render(record))?;
    if let Err(e) = fs::rename(&temp, &target) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }

    debug!("Wrote {}", target.display());
    Ok(target)
}

/// Document text of `dir`, `None` when the directory has not been analyzed.
pub fn read(dir: &Path) -> Result<Option<String>> {
    match fs::read_to_string(document_path(dir)) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Key Files ranking read back from a rendered document, in document order.
pub fn parse_key_files(text: &str) -> Vec<(String, u8)> {
    text.lines()
        .skip_while(|line| line.trim() != "## Key Files")
        .skip(1)
        .take_while(|line| !line.starts_with("## "))
        .filter_map(|line| {
            let caps = KEY_FILE_LINE.captures(line)?;
            let importance = caps.get(2)?.as_str().parse().ok()?;
            Some((caps.get(1)?.as_str().to_string(), importance))
        })
        .collect()
}
