use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Dependency cache directory never drawn in trees.
const DEPENDENCY_CACHE_DIR: &str = "node_modules";

/// Render a box-drawing listing of `root`, `max_depth` levels deep.
///
/// Dotfiles and `node_modules` are left out, directories are listed before
/// files, and a directory reached twice through symlinks is not descended
/// into again.
pub fn render_tree(root: &Path, max_depth: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}/\n", display_root(root)));

    let mut visited = HashSet::new();
    if let Ok(canonical) = root.canonicalize() {
        visited.insert(canonical);
    }

    let mut prefix_parts = Vec::new();
    walk(root, &mut prefix_parts, 1, max_depth, &mut visited, &mut out);
    out
}

fn walk(
    dir: &Path,
    prefix_parts: &mut Vec<bool>,
    depth: usize,
    max_depth: usize,
    visited: &mut HashSet<PathBuf>,
    out: &mut String,
) {
    if depth > max_depth {
        return;
    }

    let Ok(read_dir) = fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<(String, PathBuf, bool)> = read_dir
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || name == DEPENDENCY_CACHE_DIR {
                return None;
            }
            let path = entry.path();
            let is_dir = path.is_dir();
            Some((name, path, is_dir))
        })
        .collect();

    entries.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let len = entries.len();
    for (idx, (name, path, is_dir)) in entries.into_iter().enumerate() {
        let is_last = idx + 1 == len;

        let mut prefix = String::new();
        for &has_more in prefix_parts.iter() {
            prefix.push_str(if has_more { "│   " } else { "    " });
        }
        let branch = if is_last { "└── " } else { "├── " };
        let suffix = if is_dir { "/" } else { "" };
        out.push_str(&format!("{}{}{}{}\n", prefix, branch, name, suffix));

        if !is_dir || depth == max_depth {
            continue;
        }

        let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !visited.insert(canonical) {
            continue;
        }

        prefix_parts.push(!is_last);
        walk(&path, prefix_parts, depth + 1, max_depth, visited, out);
        prefix_parts.pop();
    }
}

fn display_root(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/api/v1")).unwrap();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::write(root.join("src/api/routes.ts"), "").unwrap();
        fs::write(root.join("src/api/v1/deep.ts"), "").unwrap();
        fs::write(root.join("src/index.ts"), "").unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join(".context.md"), "# doc").unwrap();
        temp_dir
    }

    fn lines_after_root(tree: &str) -> Vec<&str> {
        tree.lines().skip(1).collect()
    }

    #[test]
    fn test_render_tree_depth_one() {
        let temp_dir = fixture();
        let tree = render_tree(temp_dir.path(), 1);
        assert_eq!(lines_after_root(&tree), vec!["├── src/", "└── package.json"]);
    }

    #[test]
    fn test_render_tree_depth_two() {
        let temp_dir = fixture();
        let tree = render_tree(&temp_dir.path().join("src"), 2);
        assert_eq!(
            tree,
            "src/\n├── api/\n│   ├── v1/\n│   └── routes.ts\n└── index.ts\n"
        );
    }

    #[test]
    fn test_render_tree_excludes_dotfiles_and_dependency_cache() {
        let temp_dir = fixture();
        let tree = render_tree(temp_dir.path(), 5);
        assert!(!tree.contains(".context.md"));
        assert!(!tree.contains("node_modules"));
        assert!(tree.contains("deep.ts"));
    }

    #[test]
    fn test_render_tree_last_branch_uses_spaces() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("only/inner")).unwrap();
        fs::write(root.join("only/inner/file.ts"), "").unwrap();

        let tree = render_tree(root, 3);
        assert_eq!(
            lines_after_root(&tree),
            vec!["└── only/", "    └── inner/", "        └── file.ts"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_render_tree_symlink_cycle_terminates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a")).unwrap();
        std::os::unix::fs::symlink(root, root.join("a/loop")).unwrap();

        let tree = render_tree(root, 10);
        assert!(tree.lines().count() < 10);
    }

    #[test]
    fn test_render_tree_missing_root() {
        let tree = render_tree(Path::new("/nonexistent/dir-context/root"), 2);
        assert_eq!(tree, "root/\n");
    }
}
