//! End-to-end tests for analyzing project trees and reading the results back.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use dir_context::document::{self, parse_key_files};
use dir_context::{
    AgentCollaborator, AgentSettings, AnalysisMode, Collaborators, Configuration,
    ContextSynthesizer, ContextView, DirectoryAnalyzer, IgnoreFilter, NoVersionControl,
    ProjectWalker, RefreshPlanner, RefreshScope,
};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_project() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    write(root, "package.json", "{\"name\": \"sample\"}");
    write(
        root,
        "src/index.ts",
        "import express from 'express';\nimport { route } from './api/routes';\n\nexport function start(port) {\n  return express().listen(port);\n}\n",
    );
    write(
        root,
        "src/api/routes.ts",
        "export const route = (req, res) => res.send('ok');\n",
    );
    write(
        root,
        "src/api/user.service.ts",
        "export class UserService {\n  find(id) {\n    return id;\n  }\n}\n",
    );
    write(root, "src/utils/format.js", "function pad(s) { return s; }\n");
    write(root, "node_modules/express/index.js", "module.exports = {};\n");
    write(root, "dist/bundle.js", "minified");
    write(root, "logs/server.log", "started");
    temp_dir
}

fn quick_config() -> Configuration {
    Configuration {
        mode: AnalysisMode::Quick,
        ..Configuration::default()
    }
}

fn analyzer(root: &Path, config: Configuration, collaborators: Collaborators) -> DirectoryAnalyzer {
    let filter = IgnoreFilter::new(root, &config.ignore_patterns).expect("valid patterns");
    DirectoryAnalyzer::new(config, filter, collaborators)
}

mod whole_tree {
    use super::*;

    #[tokio::test]
    async fn test_walk_documents_every_included_directory() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let analyzer = analyzer(root, quick_config(), Collaborators::offline());

        let dirs = ProjectWalker::new(analyzer.filter()).walk(root);
        for dir in &dirs {
            analyzer.analyze(dir).await.unwrap();
        }

        for dir in ["", "src", "src/api", "src/utils", "logs"] {
            assert!(
                document::document_path(&root.join(dir)).exists(),
                "missing document in {:?}",
                dir
            );
        }
        assert!(!document::document_path(&root.join("node_modules")).exists());
        assert!(!document::document_path(&root.join("node_modules/express")).exists());
        assert!(!document::document_path(&root.join("dist")).exists());
    }

    #[tokio::test]
    async fn test_key_files_sorted_and_respect_ignore_filter() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let analyzer = analyzer(root, quick_config(), Collaborators::offline());

        let logs = analyzer.build_record(&root.join("logs")).await.unwrap();
        assert!(logs.key_files.is_empty());

        let api = analyzer.build_record(&root.join("src/api")).await.unwrap();
        assert!(api.key_files.len() <= 10);
        assert!(api
            .key_files
            .windows(2)
            .all(|w| w[0].importance >= w[1].importance));
        assert_eq!(api.purpose, "API endpoints and client code");

        let service = api
            .key_files
            .iter()
            .find(|f| f.path == "user.service.ts")
            .unwrap();
        assert_eq!(service.description, "Defines UserService class with 1 methods");
    }

    #[tokio::test]
    async fn test_rendered_ranking_reads_back_in_order() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let analyzer = analyzer(root, quick_config(), Collaborators::offline());

        let record = analyzer.analyze(&root.join("src")).await.unwrap();
        let text = document::read(&root.join("src")).unwrap().unwrap();

        let expected: Vec<(String, u8)> = record
            .key_files
            .iter()
            .map(|f| (f.path.clone(), f.importance))
            .collect();
        assert_eq!(parse_key_files(&text), expected);
    }

    #[tokio::test]
    async fn test_unchanged_directory_reanalysis_is_byte_identical() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let analyzer = analyzer(root, quick_config(), Collaborators::offline());
        let src = root.join("src");

        analyzer.analyze(&src).await.unwrap();
        let first = fs::read_to_string(document::document_path(&src)).unwrap();
        analyzer.analyze(&src).await.unwrap();
        let second = fs::read_to_string(document::document_path(&src)).unwrap();
        assert_eq!(first, second);
    }
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn test_entry_point_without_tests() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "feature/index.ts", "export function run(x) {\n  return x * 2;\n}\n");

        let analyzer = analyzer(root, quick_config(), Collaborators::offline());
        analyzer.analyze(&root.join("feature")).await.unwrap();

        let text = document::read(&root.join("feature")).unwrap().unwrap();
        assert!(text.contains("1. `index.ts` (importance 10) - Module entry point and exports"));
        assert!(text.contains("   - Functions: run(x)"));
        assert!(text.to_lowercase().contains("add unit tests"));
        assert_eq!(parse_key_files(&text), vec![("index.ts".to_string(), 10)]);
    }

    #[tokio::test]
    async fn test_utils_directory_purpose() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "utils/anything.rb", "puts 1");
        write(root, "utils/index.ts", "export class Foo {}\n");

        let analyzer = analyzer(root, quick_config(), Collaborators::offline());
        let record = analyzer.build_record(&root.join("utils")).await.unwrap();
        assert_eq!(record.purpose, "Utility functions and helper modules");
    }

    #[tokio::test]
    async fn test_no_repository_yields_empty_history() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "lib/a.ts", "export const a = 1;\n");

        let mut config = quick_config();
        config.integrations.git = true;
        let collaborators =
            Collaborators::from_config(&config, AgentSettings::from_env()).unwrap();
        let analyzer = analyzer(root, config, collaborators);

        let record = analyzer.build_record(&root.join("lib")).await.unwrap();
        assert!(record.recent_changes.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_path_refreshes_only_that_directory() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let analyzer = analyzer(root, quick_config(), Collaborators::offline());
        let vcs = NoVersionControl;
        let planner = RefreshPlanner::new(root, analyzer.filter(), &vcs);

        let dirs = planner
            .resolve(&RefreshScope::Path("src/api".into()))
            .await
            .unwrap();
        assert_eq!(dirs.len(), 1);
        for dir in &dirs {
            analyzer.analyze(dir).await.unwrap();
        }

        assert!(document::document_path(&root.join("src/api")).exists());
        assert!(!document::document_path(&root.join("src")).exists());
        assert!(!document::document_path(&root.join("src/utils")).exists());
        assert!(!document::document_path(root).exists());
    }

    #[tokio::test]
    async fn test_unreachable_ai_keeps_heuristic_result() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let src = root.join("src");

        let offline = analyzer(root, quick_config(), Collaborators::offline())
            .build_record(&src)
            .await
            .unwrap();

        // Bind and drop a listener so the port refuses connections
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let settings = AgentSettings {
            endpoint: format!("http://127.0.0.1:{}/v1", port),
            model: "test-model".to_string(),
            api_key: Some("test-token".to_string()),
            timeout: Duration::from_secs(2),
        };
        let collaborators = Collaborators {
            ai: Some(Arc::new(AgentCollaborator::new(settings, true).unwrap())),
            vcs: Arc::new(NoVersionControl),
        };
        let smart = Configuration {
            mode: AnalysisMode::Smart,
            ..Configuration::default()
        };
        let degraded = analyzer(root, smart, collaborators)
            .with_timeouts(Duration::from_secs(3), Duration::from_secs(3))
            .build_record(&src)
            .await
            .unwrap();

        assert_eq!(degraded.purpose, offline.purpose);
        assert_eq!(degraded.architecture, offline.architecture);
        assert_eq!(degraded.improvements, offline.improvements);
        assert_eq!(degraded.key_files, offline.key_files);
    }
}

mod context_views {
    use super::*;

    #[tokio::test]
    async fn test_views_after_full_analysis() {
        let temp_dir = sample_project();
        let root = temp_dir.path();
        let analyzer = analyzer(root, quick_config(), Collaborators::offline());
        for dir in ProjectWalker::new(analyzer.filter()).walk(root) {
            analyzer.analyze(&dir).await.unwrap();
        }

        let synthesizer = ContextSynthesizer::new(root);

        let standard = synthesizer
            .synthesize(&root.join("src/api"), ContextView::Standard)
            .unwrap();
        assert!(standard.starts_with("# api\n"));
        assert!(standard.contains("## Parent Context (src)"));
        assert!(standard.contains("# src"));

        let directory = synthesizer
            .synthesize(&root.join("src"), ContextView::Directory)
            .unwrap();
        assert!(directory.starts_with("# src\n"));
        assert!(directory.contains("├── api/"));
        assert!(directory.contains("│   ├── routes.ts"));

        let project = synthesizer.synthesize(root, ContextView::Project).unwrap();
        assert!(project.contains("## src/api"));
        assert!(!project.contains("node_modules"));
        assert!(!project.contains("## dist"));
    }
}
