//! Git-aware discovery of parseable source files.
//!
//! Built on the `ignore` crate: .gitignore handling comes from ripgrep's
//! battle-tested walker, hidden files and symlinks are skipped, and a
//! small set of vendor/build directories is pruned even outside git
//! repositories. Results are sorted by path so downstream output is
//! reproducible.

use std::path::{Component, Path};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

use crate::languages;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the repo root.
    pub path: String,
    /// Registered language name.
    pub language: &'static str,
}

/// Directories pruned regardless of gitignore status.
const SKIP_DIRS: &[&str] = &[
    "__pycache__",
    "node_modules",
    "vendor",
    "venv",
    "env",
    "build",
    "dist",
    "target",
    "egg-info",
];

/// Discover parseable source files under `root`.
///
/// Only files whose extension maps to a registered language are returned.
/// When `langs` is non-empty, discovery is further restricted to those
/// languages (the caller validates the names against the registry).
pub fn discover_files(root: &Path, langs: &[String]) -> Result<Vec<FileEntry>> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_some_and(|t| t.is_dir())
                && (SKIP_DIRS.contains(&name.as_ref()) || name.ends_with(".egg-info")))
        })
        .build();

    let mut results = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue, // unreadable entries are skipped, not fatal
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let Some(language) = languages::for_extension(ext) else {
            continue;
        };
        if !langs.is_empty() && !langs.iter().any(|l| l == language) {
            continue;
        }

        let rel = path
            .strip_prefix(root)
            .with_context(|| format!("path {} outside root", path.display()))?;
        results.push(FileEntry {
            path: rel.to_string_lossy().replace('\\', "/"),
            language,
        });
    }

    results.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(results)
}

/// Heuristic test-file detection, used to exclude test files from the map
/// by default.
///
/// Matches on directory components (`tests/`, `test/`, `spec/`,
/// `__tests__/`) and filename patterns (`test_*`, `*_test.*`, `*_spec.*`,
/// `*.test.*`, `*.spec.*`).
pub fn is_test_file(path: &str) -> bool {
    let p = Path::new(path);

    let mut components: Vec<&str> = p
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    let Some(name) = components.pop() else {
        return false;
    };

    if components
        .iter()
        .any(|c| matches!(*c, "tests" | "test" | "spec" | "__tests__"))
    {
        return true;
    }

    if name.starts_with("test_") {
        return true;
    }
    if let Some((stem, _ext)) = name.rsplit_once('.') {
        if stem.ends_with("_test") || stem.ends_with("_spec") {
            return true;
        }
        if stem.ends_with(".test") || stem.ends_with(".spec") {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn discovers_registered_languages_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.py", "x = 1\n");
        write(dir.path(), "a.go", "package main\n");
        write(dir.path(), "notes.txt", "not source\n");
        write(dir.path(), "lib/c.rb", "class C\nend\n");

        let entries = discover_files(dir.path(), &[]).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.go", "b.py", "lib/c.rb"]);
        assert_eq!(entries[0].language, "go");
        assert_eq!(entries[1].language, "python");
        assert_eq!(entries[2].language, "ruby");
    }

    #[test]
    fn language_filter_restricts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "x = 1\n");
        write(dir.path(), "b.go", "package main\n");

        let entries = discover_files(dir.path(), &["python".to_string()]).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "a.py");
    }

    #[test]
    fn skips_vendor_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.py", "x = 1\n");
        write(dir.path(), "node_modules/dep.py", "x = 1\n");
        write(dir.path(), "__pycache__/junk.py", "x = 1\n");
        write(dir.path(), ".hidden/secret.py", "x = 1\n");

        let entries = discover_files(dir.path(), &[]).unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["keep.py"]);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_files(dir.path(), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_file_detection() {
        let cases = [
            // Directory components
            ("tests/test_scenes.py", true),
            ("tests/conftest.py", true),
            ("tests/__init__.py", true),
            ("spec/models/user_spec.rb", true),
            ("src/__tests__/foo.js", true),
            ("src/test/java/FooTest.java", true),
            ("test/foo_test.exs", true),
            // Filename patterns
            ("internal/graph/graph_test.go", true),
            ("test_helpers.py", true),
            ("user_spec.rb", true),
            ("foo.test.js", true),
            ("foo.spec.ts", true),
            // Production files
            ("loom/models.py", false),
            ("loom/routers/scenes.py", false),
            ("internal/graph/graph.go", false),
            ("conftest.py", false),
            ("testing_utils.go", false),
            ("loom/database.py", false),
        ];
        for (path, want) in cases {
            assert_eq!(is_test_file(path), want, "is_test_file({:?})", path);
        }
    }
}
