//! Structural source analysis.
//!
//! A deliberately lightweight stand-in for a real front end: imports,
//! exports and declarations are recovered with regular expressions, and the
//! result is a best-effort [`ParsedFile`]. A real parser can replace
//! [`SourceAnalyzer`] later without changing the `ParsedFile` contract.

pub mod parsed;
mod regexes;
pub mod source;

pub use parsed::{
    ClassDecl, ExportDecl, ExportKind, FunctionDecl, ImportEdge, ImportKind, InterfaceDecl,
    ParsedFile,
};
pub use source::{SourceAnalyzer, ENTRY_POINT_PURPOSE, GENERIC_PURPOSE, PARSEABLE_EXTENSIONS};
