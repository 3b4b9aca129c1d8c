use std::path::Path;

use crate::error::Result;

use super::parsed::{
    ClassDecl, ExportDecl, ExportKind, FunctionDecl, ImportEdge, ImportKind, InterfaceDecl,
    ParsedFile,
};
use super::regexes::{
    ARROW_FUNCTION, CLASS_DECL, CLASS_METHOD, EXPORT_DECL, EXPORT_DEFAULT_IDENT, FUNCTION_DECL,
    IMPORT_DEFAULT, IMPORT_NAMED, IMPORT_NAMESPACE, INTERFACE_DECL, INTERFACE_PROPERTY,
};

/// Extensions the structural analyzer understands.
pub const PARSEABLE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

pub const GENERIC_PURPOSE: &str = "Module implementation";
pub const ENTRY_POINT_PURPOSE: &str = "Module entry point and exports";

const UI_FRAMEWORK_MARKERS: &[&str] = &["react", "vue", "svelte", "@angular", "solid-js", "preact"];
const SERVER_FRAMEWORK_MARKERS: &[&str] = &["express", "koa", "fastify", "@nestjs", "hapi", "http"];

/// Words that look like method signatures inside class bodies but are not.
const NON_METHOD_KEYWORDS: &[&str] = &[
    "constructor",
    "if",
    "for",
    "while",
    "switch",
    "catch",
    "function",
    "return",
    "with",
    "else",
];

/// Tolerant, regex-driven extractor of imports, exports and declarations
/// from JavaScript and TypeScript sources.
pub struct SourceAnalyzer;

impl SourceAnalyzer {
    pub fn is_parseable(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| PARSEABLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Read and analyze a file from disk.
    ///
    /// `Ok(None)` means the extension is not handled; an unreadable file is an
    /// error the caller is expected to log and skip.
    pub fn analyze_file(path: &Path) -> Result<Option<ParsedFile>> {
        if !Self::is_parseable(path) {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::analyze(path, &content))
    }

    /// Analyze already loaded text. Returns `None` for unsupported extensions.
    pub fn analyze(path: &Path, content: &str) -> Option<ParsedFile> {
        if !Self::is_parseable(path) {
            return None;
        }

        let mut parsed = ParsedFile {
            imports: extract_imports(content),
            functions: extract_functions(content),
            classes: extract_classes(content),
            interfaces: extract_interfaces(content),
            ..Default::default()
        };
        parsed.exports = extract_exports(content, &parsed);
        parsed.main_purpose = infer_purpose(path, &parsed);

        Some(parsed)
    }
}

fn extract_imports(content: &str) -> Vec<ImportEdge> {
    let mut imports = Vec::new();

    for caps in IMPORT_NAMESPACE.captures_iter(content) {
        imports.push(ImportEdge {
            source: caps[2].to_string(),
            specifiers: vec![caps[1].to_string()],
            kind: ImportKind::Namespace,
        });
    }

    for caps in IMPORT_DEFAULT.captures_iter(content) {
        let name = caps[1].to_string();
        let source = caps[2].to_string();
        let duplicate = imports.iter().any(|i: &ImportEdge| {
            i.kind == ImportKind::Default && i.source == source && i.specifiers.contains(&name)
        });
        if !duplicate {
            imports.push(ImportEdge {
                source,
                specifiers: vec![name],
                kind: ImportKind::Default,
            });
        }
    }

    for caps in IMPORT_NAMED.captures_iter(content) {
        let mut specifiers: Vec<String> = Vec::new();
        for spec in caps[1].split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !specifiers.iter().any(|s| s == spec) {
                specifiers.push(spec.to_string());
            }
        }
        imports.push(ImportEdge {
            source: caps[2].to_string(),
            specifiers,
            kind: ImportKind::Named,
        });
    }

    imports
}

fn extract_exports(content: &str, parsed: &ParsedFile) -> Vec<ExportDecl> {
    let mut exports: Vec<ExportDecl> = Vec::new();

    for caps in EXPORT_DECL.captures_iter(content) {
        exports.push(ExportDecl {
            name: caps[3].to_string(),
            kind: ExportKind::from_keyword(&caps[2]),
            is_default: caps.get(1).is_some(),
        });
    }

    for caps in EXPORT_DEFAULT_IDENT.captures_iter(content) {
        let name = &caps[1];
        if exports.iter().any(|e| e.name == name) {
            continue;
        }
        let kind = if parsed.classes.iter().any(|c| c.name == name) {
            ExportKind::Class
        } else if parsed.functions.iter().any(|f| f.name == name) {
            ExportKind::Function
        } else if parsed.interfaces.iter().any(|i| i.name == name) {
            ExportKind::Interface
        } else {
            ExportKind::Variable
        };
        exports.push(ExportDecl {
            name: name.to_string(),
            kind,
            is_default: true,
        });
    }

    exports
}

fn extract_functions(content: &str) -> Vec<FunctionDecl> {
    let mut functions = Vec::new();

    for caps in FUNCTION_DECL.captures_iter(content) {
        let params = caps[4]
            .split(',')
            .filter_map(|p| p.split_whitespace().next())
            .map(str::to_string)
            .collect();
        functions.push(FunctionDecl {
            name: caps[3].to_string(),
            params,
            is_async: caps.get(2).is_some(),
            is_exported: caps.get(1).is_some(),
        });
    }

    // Arrow-function parameters are left undecomposed
    for caps in ARROW_FUNCTION.captures_iter(content) {
        functions.push(FunctionDecl {
            name: caps[2].to_string(),
            params: Vec::new(),
            is_async: caps.get(3).is_some(),
            is_exported: caps.get(1).is_some(),
        });
    }

    functions
}

fn extract_classes(content: &str) -> Vec<ClassDecl> {
    CLASS_DECL
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = block_body(content, whole.end());
            let methods = CLASS_METHOD
                .captures_iter(body)
                .map(|m| m[1].to_string())
                .filter(|name| !NON_METHOD_KEYWORDS.contains(&name.as_str()))
                .collect();
            Some(ClassDecl {
                name: caps[2].to_string(),
                methods,
                is_exported: caps.get(1).is_some(),
            })
        })
        .collect()
}

fn extract_interfaces(content: &str) -> Vec<InterfaceDecl> {
    INTERFACE_DECL
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = block_body(content, whole.end());
            let properties = INTERFACE_PROPERTY
                .captures_iter(body)
                .map(|p| p[1].to_string())
                .collect();
            Some(InterfaceDecl {
                name: caps[2].to_string(),
                properties,
                is_exported: caps.get(1).is_some(),
            })
        })
        .collect()
}

/// Text between an already consumed `{` at `start` and its matching `}`.
///
/// Braces are counted naively; an unbalanced block runs to end of input.
fn block_body(content: &str, start: usize) -> &str {
    let mut depth = 1usize;
    for (offset, ch) in content[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &content[start..start + offset];
                }
            }
            _ => {}
        }
    }
    &content[start..]
}

fn infer_purpose(path: &Path, parsed: &ParsedFile) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem_lower = stem.to_lowercase();

    if stem_lower.contains("test") || stem_lower.contains("spec") {
        let base = stem
            .trim_end_matches(".test")
            .trim_end_matches(".spec")
            .to_string();
        return format!("Test suite for {}", base);
    }

    if stem_lower == "index" {
        return ENTRY_POINT_PURPOSE.to_string();
    }

    if let Some(class) = parsed.classes.first() {
        return format!(
            "Defines {} class with {} methods",
            class.name,
            class.methods.len()
        );
    }

    if !parsed.interfaces.is_empty() {
        let names: Vec<&str> = parsed.interfaces.iter().map(|i| i.name.as_str()).collect();
        return format!("Type definitions: {}", names.join(", "));
    }

    let exported: Vec<&str> = parsed.exported_functions().map(|f| f.name.as_str()).collect();
    if !exported.is_empty() {
        return format!("Exports functions: {}", exported.join(", "));
    }

    let imports_any = |markers: &[&str]| {
        parsed.imports.iter().any(|i| {
            let source = i.source.to_lowercase();
            markers.iter().any(|m| source.contains(m))
        })
    };

    if imports_any(UI_FRAMEWORK_MARKERS) {
        return "UI component module".to_string();
    }

    if imports_any(SERVER_FRAMEWORK_MARKERS) {
        return "Server module handling HTTP requests".to_string();
    }

    GENERIC_PURPOSE.to_string()
}
