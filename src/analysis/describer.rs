//! Metadata-only file descriptions used before, or instead of, structural
//! analysis.

use std::path::Path;
use std::time::UNIX_EPOCH;

use super::record::FileAnalysis;

/// Well-known file names, matched case-insensitively on the full name.
const WELL_KNOWN_FILES: &[(&str, &str)] = &[
    ("package.json", "Node.js package manifest with dependencies and scripts"),
    ("package-lock.json", "Locked npm dependency tree"),
    ("yarn.lock", "Locked Yarn dependency tree"),
    ("pnpm-lock.yaml", "Locked pnpm dependency tree"),
    ("tsconfig.json", "TypeScript compiler configuration"),
    ("jsconfig.json", "JavaScript project configuration"),
    ("readme.md", "Project documentation and overview"),
    ("changelog.md", "Release history"),
    ("license", "License terms"),
    ("cargo.toml", "Rust crate manifest"),
    ("go.mod", "Go module definition"),
    ("requirements.txt", "Python dependency list"),
    ("pyproject.toml", "Python project configuration"),
    ("dockerfile", "Container image build instructions"),
    ("docker-compose.yml", "Multi-container service definitions"),
    ("makefile", "Build automation targets"),
    ("webpack.config.js", "Webpack bundler configuration"),
    ("vite.config.ts", "Vite build configuration"),
    ("jest.config.js", "Jest test runner configuration"),
    ("babel.config.js", "Babel transpiler configuration"),
];

const EXTENSION_DESCRIPTIONS: &[(&str, &str)] = &[
    ("ts", "TypeScript source file"),
    ("tsx", "TypeScript React component"),
    ("js", "JavaScript source file"),
    ("jsx", "JavaScript React component"),
    ("mjs", "JavaScript ES module"),
    ("cjs", "CommonJS module"),
    ("py", "Python source file"),
    ("rs", "Rust source file"),
    ("go", "Go source file"),
    ("java", "Java source file"),
    ("kt", "Kotlin source file"),
    ("rb", "Ruby source file"),
    ("php", "PHP source file"),
    ("cs", "C# source file"),
    ("cpp", "C++ source file"),
    ("c", "C source file"),
    ("h", "C/C++ header file"),
    ("swift", "Swift source file"),
    ("vue", "Vue single-file component"),
    ("svelte", "Svelte component"),
    ("json", "JSON data or configuration"),
    ("md", "Markdown documentation"),
    ("yml", "YAML configuration"),
    ("yaml", "YAML configuration"),
    ("toml", "TOML configuration"),
    ("css", "Stylesheet"),
    ("scss", "Sass stylesheet"),
    ("html", "HTML document"),
    ("sh", "Shell script"),
    ("sql", "SQL script"),
    ("txt", "Plain text file"),
];

/// Extensions that count as source code for importance scoring.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "rs", "go", "java", "kt", "rb", "php", "cs",
    "cpp", "c", "h", "swift", "vue", "svelte",
];

/// Substrings that mark entry points, manifests and configuration.
const IMPORTANCE_KEYWORDS: &[&str] = &[
    "index",
    "main",
    "app.",
    "server",
    "config",
    "package.json",
    "readme",
    "cargo.toml",
    "tsconfig",
    "dockerfile",
    "makefile",
    "setup",
    "manifest",
];

const FUNCTION_KEYWORDS: &[(&str, &str)] = &[
    ("auth", "Authentication and authorization"),
    ("login", "Authentication and authorization"),
    ("api", "API communication"),
    ("route", "Request routing"),
    ("controller", "Request handling"),
    ("middleware", "Middleware processing"),
    ("service", "Business logic"),
    ("model", "Data modeling"),
    ("schema", "Schema definitions"),
    ("util", "Utility helpers"),
    ("helper", "Utility helpers"),
    ("config", "Configuration management"),
    ("store", "State management"),
    ("hook", "Reusable hooks"),
    ("component", "UI rendering"),
    ("database", "Data persistence"),
    ("db", "Data persistence"),
    ("type", "Type definitions"),
    ("valid", "Input validation"),
    ("format", "Data formatting"),
    ("parse", "Parsing"),
    ("client", "Client communication"),
    ("server", "Server setup"),
    ("log", "Logging"),
];

const MAX_PRIMARY_FUNCTIONS: usize = 3;

pub struct FileDescriber;

impl FileDescriber {
    /// Describe a file from its name and filesystem metadata only.
    pub fn describe(path: &Path) -> FileAnalysis {
        let name = file_name(path);

        let last_modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        FileAnalysis {
            description: Self::description(&name),
            importance: Self::importance(&name),
            primary_functions: Self::primary_functions(&name),
            path: name,
            last_modified,
        }
    }

    pub fn description(name: &str) -> String {
        let lower = name.to_lowercase();

        if let Some((_, desc)) = WELL_KNOWN_FILES.iter().find(|(known, _)| *known == lower) {
            return desc.to_string();
        }

        if lower.ends_with(".d.ts") {
            return "TypeScript type declarations".to_string();
        }

        match extension(name) {
            Some(ext) => EXTENSION_DESCRIPTIONS
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, desc)| desc.to_string())
                .unwrap_or_else(|| format!("{} file", ext.to_uppercase())),
            None => "File".to_string(),
        }
    }

    pub fn importance(name: &str) -> u8 {
        let lower = name.to_lowercase();

        if IMPORTANCE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            10
        } else if is_test_file(name) {
            3
        } else if extension(name).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str())) {
            7
        } else {
            5
        }
    }

    pub fn primary_functions(name: &str) -> Vec<String> {
        let stem = stem(name).to_lowercase();

        if is_test_file(name) {
            let label = if stem.contains("spec") {
                "Test cases"
            } else {
                "Unit tests"
            };
            return vec![label.to_string()];
        }

        let mut functions: Vec<String> = Vec::new();
        for (keyword, label) in FUNCTION_KEYWORDS {
            if functions.len() == MAX_PRIMARY_FUNCTIONS {
                break;
            }
            if stem.contains(keyword) && !functions.iter().any(|f| f == label) {
                functions.push(label.to_string());
            }
        }

        if functions.is_empty() {
            functions.push("General functionality".to_string());
        }
        functions
    }
}

/// Test or spec file, judged by the file stem.
pub fn is_test_file(name: &str) -> bool {
    let stem = stem(name).to_lowercase();
    stem.contains("test") || stem.contains("spec")
}

pub(crate) fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

fn stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
