//! Integration tests for CLI commands.
//!
//! These tests run the compiled binary against temporary projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

use dir_context::config::CONFIG_FILENAME;
use dir_context::{Configuration, OutputFormat, DOCUMENT_FILENAME};

fn dir_context(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dir-context"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("RUST_LOG", "dir_context=warn")
        .env_remove("DIRCONTEXT_AGENT_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .output()
        .expect("Failed to run dir-context")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn create_project() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src/components")).unwrap();
    fs::create_dir_all(root.join("build")).unwrap();
    fs::write(root.join("README.md"), "# Demo\n").unwrap();
    fs::write(
        root.join("src/index.ts"),
        "import React from 'react';\nexport function mount(el) {}\n",
    )
    .unwrap();
    fs::write(
        root.join("src/components/Button.tsx"),
        "export const Button = () => null;\n",
    )
    .unwrap();
    fs::write(root.join("build/out.js"), "compiled").unwrap();
    temp_dir
}

fn init_quick(root: &Path) {
    let output = dir_context(root, &["init", "--mode", "quick", "--no-git"]);
    assert!(output.status.success(), "init failed: {}", stderr(&output));
}

mod init_command {
    use super::*;

    #[test]
    fn test_init_writes_config_and_documents() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let config = Configuration::load(root).unwrap();
        assert_eq!(config.mode.as_str(), "quick");
        assert!(!config.integrations.git);
        assert!(!config.integrations.claude);
        assert!(root.join(CONFIG_FILENAME).exists());

        assert!(root.join(DOCUMENT_FILENAME).exists());
        assert!(root.join("src").join(DOCUMENT_FILENAME).exists());
        assert!(root.join("src/components").join(DOCUMENT_FILENAME).exists());
        assert!(!root.join("build").join(DOCUMENT_FILENAME).exists());
    }

    #[test]
    fn test_init_extra_ignore_pattern() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        let output = dir_context(
            root,
            &["init", "--mode", "quick", "--no-git", "--ignore", "src/components/"],
        );
        assert!(output.status.success(), "init failed: {}", stderr(&output));

        let config = Configuration::load(root).unwrap();
        assert!(config
            .ignore_patterns
            .contains(&"src/components/".to_string()));
        assert!(!root.join("src/components").join(DOCUMENT_FILENAME).exists());
    }

    #[test]
    fn test_init_rejects_unknown_mode() {
        let temp_dir = create_project();
        let output = dir_context(temp_dir.path(), &["init", "--mode", "turbo"]);
        assert!(!output.status.success());
        assert!(!temp_dir.path().join(CONFIG_FILENAME).exists());
    }
}

mod refresh_command {
    use super::*;

    #[test]
    fn test_refresh_requires_init() {
        let temp_dir = create_project();
        let output = dir_context(temp_dir.path(), &["refresh", "--all"]);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("dir-context init"));
    }

    #[test]
    fn test_refresh_dry_run_lists_directories() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let output = dir_context(root, &["refresh", "--all", "--dry-run"]);
        assert!(output.status.success(), "{}", stderr(&output));
        let lines: Vec<String> = stdout(&output).lines().map(|l| l.replace('\\', "/")).collect();
        assert_eq!(lines, vec![".", "src", "src/components"]);
    }

    #[test]
    fn test_refresh_single_path() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        fs::remove_file(root.join("src").join(DOCUMENT_FILENAME)).unwrap();
        fs::remove_file(root.join("src/components").join(DOCUMENT_FILENAME)).unwrap();

        let output = dir_context(root, &["refresh", "--path", "src/components"]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(root.join("src/components").join(DOCUMENT_FILENAME).exists());
        assert!(!root.join("src").join(DOCUMENT_FILENAME).exists());
    }

    #[test]
    fn test_refresh_path_prints_json_record() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let mut config = Configuration::load(root).unwrap();
        config.output_format = OutputFormat::Json;
        config.save(root).unwrap();
        let saved = fs::read_to_string(root.join(CONFIG_FILENAME)).unwrap();
        assert!(saved.contains("\"outputFormat\": \"json\""));

        let output = dir_context(root, &["refresh", "--path", "src"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let text = stdout(&output);
        let start = text.find('{').expect("JSON record on stdout");
        let record: serde_json::Value = serde_json::from_str(text[start..].trim()).unwrap();
        assert!(record.get("purpose").and_then(|p| p.as_str()).is_some());
        let key_files = record["key_files"].as_array().unwrap();
        assert!(key_files.iter().any(|f| f["path"] == "index.ts"));
    }

    #[test]
    fn test_refresh_path_markdown_prints_no_json() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let output = dir_context(root, &["refresh", "--path", "src"]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(!stdout(&output).contains('{'));
    }

    #[test]
    fn test_refresh_path_outside_root_fails() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let outside = TempDir::new().unwrap();
        let output = dir_context(
            root,
            &["refresh", "--path", outside.path().to_str().unwrap()],
        );
        assert!(!output.status.success());
    }

    #[test]
    fn test_refresh_without_git_has_nothing_to_do() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let output = dir_context(root, &["refresh"]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("No changed directories"));
    }
}

mod context_command {
    use super::*;

    #[test]
    fn test_context_requires_init() {
        let temp_dir = create_project();
        let output = dir_context(temp_dir.path(), &["context"]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_context_standard_view() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let output = dir_context(root, &["context", "--path", "src/components"]);
        assert!(output.status.success(), "{}", stderr(&output));
        let text = stdout(&output);
        assert!(text.starts_with("# components\n"));
        assert!(text.contains("Parent Context (src)"));
    }

    #[test]
    fn test_context_project_view_to_file() {
        let temp_dir = create_project();
        let root = temp_dir.path();
        init_quick(root);

        let target = root.join("CONTEXT.md");
        let output = dir_context(
            root,
            &[
                "context",
                "--view",
                "project",
                "--output",
                target.to_str().unwrap(),
            ],
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let text = fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("# Project Structure"));
        assert!(text.contains("## src/components"));
        assert!(!text.contains("## build"));
    }
}
