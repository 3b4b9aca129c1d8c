//! Patterns for the textual source analyzer, compiled once on first use.

use once_cell::sync::Lazy;
use regex::Regex;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

/// `import * as ns from 'mod'`
pub(crate) static IMPORT_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*import\s+\*\s+as\s+([A-Za-z_$][\w$]*)\s+from\s+['"]([^'"]+)['"]"#)
});

/// `import Name from 'mod'` and `import Name, { a } from 'mod'`
pub(crate) static IMPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*import\s+([A-Za-z_$][\w$]*)\s*(?:,\s*(?:\{[^}]*\}|\*\s+as\s+[\w$]+)\s*)?\s+from\s+['"]([^'"]+)['"]"#)
});

/// `import { a, b as c } from 'mod'`, optionally after a default binding
pub(crate) static IMPORT_NAMED: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*import\s+(?:type\s+)?(?:[A-Za-z_$][\w$]*\s*,\s*)?\{([^}]*)\}\s*from\s+['"]([^'"]+)['"]"#)
});

/// `export [default] [async] function|class|interface|const|... Name`
pub(crate) static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*export\s+(default\s+)?(?:declare\s+)?(?:async\s+)?(function\s*\*?|abstract\s+class|class|interface|const|let|var|type|enum)\s+([A-Za-z_$][\w$]*)"#)
});

/// `export default Name;`
pub(crate) static EXPORT_DEFAULT_IDENT: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*export\s+default\s+([A-Za-z_$][\w$]*)\s*;?\s*$"#)
});

/// `[export] [default] [async] function name(params)`
pub(crate) static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*(export\s+)?(?:default\s+)?(async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^>(]*>)?\s*\(([^)]*)\)"#)
});

/// `[export] const name = [async] (params) =>` and `const name = x =>`
pub(crate) static ARROW_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*(export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=\s*(async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::\s*[^=\n]+)?=>"#)
});

/// `[export] [default] [abstract] class Name ... {`
pub(crate) static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*(export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)[^{]*\{"#)
});

/// Method-like signature inside a class body: `[modifiers] name(...) [: T] {`
pub(crate) static CLASS_METHOD: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)\s+)*\*?\s*([A-Za-z_$#][\w$]*)\s*(?:<[^>(]*>)?\s*\([^)]*\)\s*(?::\s*[^{;=]+)?\{"#)
});

/// `[export] interface Name ... {`
pub(crate) static INTERFACE_DECL: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*(export\s+)?(?:declare\s+)?interface\s+([A-Za-z_$][\w$]*)[^{]*\{"#)
});

/// Property-like token inside an interface body: `name:` or `name?:`
pub(crate) static INTERFACE_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?m)^\s*(?:readonly\s+)?([A-Za-z_$][\w$]*)\??\s*:"#)
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        let patterns: [&Lazy<Regex>; 11] = [
            &IMPORT_NAMESPACE,
            &IMPORT_DEFAULT,
            &IMPORT_NAMED,
            &EXPORT_DECL,
            &EXPORT_DEFAULT_IDENT,
            &FUNCTION_DECL,
            &ARROW_FUNCTION,
            &CLASS_DECL,
            &CLASS_METHOD,
            &INTERFACE_DECL,
            &INTERFACE_PROPERTY,
        ];
        for pattern in patterns {
            assert!(!pattern.as_str().is_empty());
        }
    }

    #[test]
    fn test_import_default_with_named_tail() {
        let caps = IMPORT_DEFAULT
            .captures("import React, { useState } from 'react';")
            .unwrap();
        assert_eq!(&caps[1], "React");
        assert_eq!(&caps[2], "react");
    }

    #[test]
    fn test_import_named_does_not_match_default_only() {
        assert!(IMPORT_NAMED.captures("import React from 'react';").is_none());
    }

    #[test]
    fn test_arrow_function_forms() {
        assert!(ARROW_FUNCTION.is_match("export const add = (a, b) => a + b;"));
        assert!(ARROW_FUNCTION.is_match("const double = x => x * 2;"));
        assert!(ARROW_FUNCTION.is_match("const load = async (): Promise<void> => {"));
        assert!(!ARROW_FUNCTION.is_match("const value = 42;"));
    }
}
