//! Directory scanning with ignore rules.
//!
//! Produces the immutable per-run snapshot of source files the pipeline
//! consumes. Applies a built-in ignore list, hidden-entry filtering, and a
//! `.gitignore` subset (name and path patterns, root-only `/` prefixes,
//! `*`/`**` wildcards, `!` negations). Unreadable or non-UTF-8 entries are
//! skipped, never fatal.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use globset::{Glob, GlobMatcher};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions the pipeline understands, without dot.
const SUPPORTED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "tsx", "jsx", "svelte"];

/// Directory names never worth scanning.
const DEFAULT_IGNORE: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".svelte-kit",
    ".next",
    "coverage",
    "vendor",
    "__pycache__",
    ".turbo",
    ".output",
    ".nuxt",
    ".cache",
];

/// Errors surfaced by the scanner.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot access {path}: {source}")]
    Inaccessible {
        path: String,
        source: std::io::Error,
    },
}

/// One source file of the run snapshot. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Repo-relative forward-slash path, the unique key.
    pub path: String,
    /// Extension without dot.
    pub extension: String,
    pub content: String,
    pub size: u64,
    /// Newline-separated segment count (a trailing newline counts).
    pub lines: usize,
}

/// Scanner options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Maximum directory depth below the root; None means unlimited.
    pub depth: Option<usize>,
}

/// One parsed `.gitignore` pattern.
struct IgnorePattern {
    raw: String,
    root_only: bool,
    glob: Option<GlobMatcher>,
}

/// The ignore rules of one scan.
struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
    negations: HashSet<String>,
}

impl IgnoreRules {
    fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            negations: HashSet::new(),
        }
    }

    fn parse(content: &str) -> Self {
        let mut rules = Self::empty();

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // negation: explicitly un-ignored names win
            if let Some(rest) = line.strip_prefix('!') {
                let cleaned = rest.trim_end_matches('/').trim_start_matches('/');
                rules.negations.insert(cleaned.to_string());
                continue;
            }

            let mut pattern = line.trim_end_matches('/').to_string();
            let root_only = pattern.starts_with('/');
            if root_only {
                pattern = pattern[1..].to_string();
            }

            let glob = if pattern.contains('*') {
                Glob::new(&pattern).ok().map(|g| g.compile_matcher())
            } else {
                None
            };

            rules.patterns.push(IgnorePattern {
                raw: pattern,
                root_only,
                glob,
            });
        }

        rules
    }

    /// Whether an entry (by relative path and base name) should be skipped.
    fn should_ignore(&self, relative_path: &str, name: &str) -> bool {
        if DEFAULT_IGNORE.contains(&name) {
            return true;
        }
        if name.starts_with('.') && name != "." {
            return true;
        }

        if self.negations.contains(name) || self.negations.contains(relative_path) {
            return false;
        }

        self.patterns
            .iter()
            .any(|p| p.matches(relative_path, name))
    }
}

impl IgnorePattern {
    fn matches(&self, relative_path: &str, name: &str) -> bool {
        if self.raw == name {
            return true;
        }

        if let Some(glob) = &self.glob {
            if glob.is_match(name) || glob.is_match(relative_path) {
                return true;
            }
        }

        // path pattern: must match complete segments
        if self.raw.contains('/') {
            if self.root_only {
                return relative_path == self.raw
                    || relative_path.starts_with(&format!("{}/", self.raw));
            }
            return relative_path.contains(&format!("{}/", self.raw))
                || relative_path.ends_with(&self.raw)
                || relative_path == self.raw;
        }

        // bare name: match any path segment exactly
        if self.root_only {
            return relative_path.split('/').next() == Some(self.raw.as_str());
        }
        relative_path.split('/').any(|segment| segment == self.raw)
    }
}

/// Scan a directory into the sorted source-file snapshot.
pub fn scan_directory(root: &Path, options: ScanOptions) -> Result<Vec<SourceFile>, ScanError> {
    let root = root
        .canonicalize()
        .map_err(|source| ScanError::Inaccessible {
            path: root.display().to_string(),
            source,
        })?;

    let rules = fs::read_to_string(root.join(".gitignore"))
        .map(|content| IgnoreRules::parse(&content))
        .unwrap_or_else(|_| IgnoreRules::empty());

    let mut walker = WalkDir::new(&root).follow_links(false);
    if let Some(depth) = options.depth {
        walker = walker.max_depth(depth + 1);
    }

    let root_for_filter = root.clone();
    let mut files = Vec::new();

    for entry in walker.into_iter().filter_entry(|e| {
        if e.depth() == 0 {
            return true;
        }
        let name = e.file_name().to_string_lossy();
        let relative = relative_path(&root_for_filter, e.path());
        !rules.should_ignore(&relative, &name)
    }) {
        let Ok(entry) = entry else {
            continue; // permission denied and similar
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let extension = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if !SUPPORTED_EXTENSIONS.contains(&extension) {
            continue;
        }

        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue; // unreadable or not UTF-8
        };
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        files.push(SourceFile {
            path: relative_path(&root, entry.path()),
            extension: extension.to_string(),
            lines: content.split('\n').count(),
            size,
            content,
        });
    }

    // deterministic order regardless of filesystem iteration
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Repo-relative forward-slash path for an entry.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
