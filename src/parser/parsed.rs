//! Structural facts extracted from one source file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    /// Module reference exactly as written in the import statement
    pub source: String,
    /// Names bound by the import, without duplicates
    pub specifiers: Vec<String>,
    pub kind: ImportKind,
}

impl ImportEdge {
    /// Whether the module reference points at a package rather than a file.
    pub fn is_external(&self) -> bool {
        !(self.source.starts_with('.') || self.source.starts_with('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Function,
    Class,
    Interface,
    Variable,
    Type,
}

impl ExportKind {
    /// Map a declaration keyword (`function`, `const`, `enum`, ...) to a kind.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim() {
            k if k.starts_with("function") => ExportKind::Function,
            k if k.ends_with("class") => ExportKind::Class,
            "interface" => ExportKind::Interface,
            "type" | "enum" => ExportKind::Type,
            _ => ExportKind::Variable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub name: String,
    pub kind: ExportKind,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub is_async: bool,
    pub is_exported: bool,
}

impl FunctionDecl {
    /// `name(a, b)` rendering used for primary-function lists.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    /// Method names in declaration order, constructor excluded
    pub methods: Vec<String>,
    pub is_exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub properties: Vec<String>,
    pub is_exported: bool,
}

/// Best-effort structural summary of one source file.
///
/// Produced by a tolerant textual extractor: it may miss declarations that
/// span unusual layouts and may pick up look-alikes inside strings or
/// comments. Consumers must not treat it as a sound parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub imports: Vec<ImportEdge>,
    pub exports: Vec<ExportDecl>,
    pub functions: Vec<FunctionDecl>,
    pub classes: Vec<ClassDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub main_purpose: String,
}

impl ParsedFile {
    pub fn exported_functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter().filter(|f| f.is_exported)
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.exports.is_empty()
            && self.functions.is_empty()
            && self.classes.is_empty()
            && self.interfaces.is_empty()
    }
}
