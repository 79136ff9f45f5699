//! Dead-export and orphan-file detection.
//!
//! Both analyses need the complete edge set: per target file, the union of
//! every name any importer pulls in. An empty specifier list on an edge
//! means a namespace or side-effect import — recorded as `*`, everything
//! in the target counts as used.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalyzedFile, ExportKind};
use crate::graph::DependencyGraph;
use crate::routes::Route;

static CONFIG_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(config|rc)\.(js|ts|mjs|cjs)$|\.eslintrc|\.prettierrc|tailwind|postcss|vite\.config")
        .unwrap()
});

static TEST_PATTERNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(test|spec|e2e)\.(js|ts|jsx|tsx)$|__tests__").unwrap());

static ROUTE_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+page\.|/\+server\.|/\+layout\.|/\+error\.|/page\.(tsx|jsx)|/route\.(ts|js)|/layout\.(tsx|jsx)")
        .unwrap()
});

static HOOKS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"hooks\.(server|client)\.(js|ts)$").unwrap());

static SCRIPT_DIR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(bin|scripts)/").unwrap());

static INDEX_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|/)index\.(js|ts|mjs)$").unwrap());

static MAIN_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(src/)?(main|app|server)\.(js|ts|mjs)$").unwrap());

static SERVER_ROUTE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+page\.server\.|^\+layout\.server\.").unwrap());

/// An export no resolved import ever references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadExport {
    pub file: String,
    pub export: String,
    #[serde(rename = "type")]
    pub kind: ExportKind,
    pub line: usize,
    /// Distinct internal files importing anything from this file.
    pub importer_count: usize,
}

/// A file with no incoming internal edge that is not a deliberate entry
/// point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanFile {
    pub file: String,
    pub reason: String,
}

/// Names imported per target file, plus the distinct importers.
struct ImportedNames {
    names: HashMap<String, HashSet<String>>,
    importers: HashMap<String, HashSet<String>>,
}

fn collect_imported_names(graph: &DependencyGraph) -> ImportedNames {
    let mut names: HashMap<String, HashSet<String>> = HashMap::new();
    let mut importers: HashMap<String, HashSet<String>> = HashMap::new();

    for edge in graph.internal_edges() {
        let entry = names.entry(edge.target.clone()).or_default();
        for spec in &edge.specifiers {
            let name = if !spec.imported.is_empty() {
                spec.imported.clone()
            } else if !spec.local.is_empty() {
                spec.local.clone()
            } else {
                "*".to_string()
            };
            entry.insert(name);
        }
        // no specific names: namespace or side-effect import, treat
        // everything in the target as used
        if edge.specifiers.is_empty() {
            entry.insert("*".to_string());
        }

        importers
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.source.clone());
    }

    ImportedNames { names, importers }
}

/// Flag exports never referenced by any resolved import specifier.
pub fn find_dead_exports(graph: &DependencyGraph, files: &[AnalyzedFile]) -> Vec<DeadExport> {
    let imported = collect_imported_names(graph);
    let mut dead = Vec::new();

    for file in files {
        if file.exports.is_empty() {
            continue;
        }
        // entry-shaped files export outward; skip them entirely
        if is_entry_point(&file.path) {
            continue;
        }

        let importer_count = imported
            .importers
            .get(&file.path)
            .map(|s| s.len())
            .unwrap_or(0);

        let Some(names) = imported.names.get(&file.path) else {
            // nothing imports this file: every export is unreferenced
            for export in &file.exports {
                dead.push(DeadExport {
                    file: file.path.clone(),
                    export: export.name.clone(),
                    kind: export.kind,
                    line: export.line,
                    importer_count,
                });
            }
            continue;
        };

        // a namespace importer may use anything
        if names.contains("*") {
            continue;
        }

        // component files imported by their default name expose members
        // accessed indirectly (e.g. bind:this) — presume all used
        if file.path.ends_with(".svelte") && names.contains("default") {
            continue;
        }

        for export in &file.exports {
            if names.contains(&export.name) {
                continue;
            }
            // a default export rides along as a convenience alias when any
            // other named export of the file is in use
            if export.name == "default"
                && file
                    .exports
                    .iter()
                    .any(|e| e.name != "default" && names.contains(&e.name))
            {
                continue;
            }

            dead.push(DeadExport {
                file: file.path.clone(),
                export: export.name.clone(),
                kind: export.kind,
                line: export.line,
                importer_count,
            });
        }
    }

    dead
}

/// Files with no incoming internal edge that are neither entry points nor
/// designated route files.
pub fn find_orphan_files(
    graph: &DependencyGraph,
    files: &[AnalyzedFile],
    routes: &[Route],
) -> Vec<OrphanFile> {
    let mut imported = HashSet::new();
    for edge in graph.internal_edges() {
        imported.insert(edge.target.as_str());
    }

    let route_files: HashSet<&str> = routes.iter().map(|r| r.file.as_str()).collect();
    let mut orphans = Vec::new();

    for file in files {
        if imported.contains(file.path.as_str()) {
            continue;
        }
        if is_entry_point(&file.path) {
            continue;
        }
        if route_files.contains(file.path.as_str()) {
            continue;
        }

        let reason = if file.exports.is_empty() {
            "No exports and not imported"
        } else {
            "Not imported by any other file"
        };
        orphans.push(OrphanFile {
            file: file.path.clone(),
            reason: reason.to_string(),
        });
    }

    orphans
}

/// Entry-shaped paths whose exports face outward: config, test, route,
/// declaration, hook, script, and conventional main files.
fn is_entry_point(path: &str) -> bool {
    if CONFIG_PATTERNS.is_match(path) {
        return true;
    }
    if TEST_PATTERNS.is_match(path) {
        return true;
    }
    if ROUTE_PATTERNS.is_match(path) {
        return true;
    }
    // TypeScript declaration files are not regular code
    if path.ends_with(".d.ts") {
        return true;
    }
    // components under a route tree are mounted by the framework
    if path.contains("routes/") && path.ends_with(".svelte") {
        return true;
    }
    if SERVER_ROUTE_PATTERN.is_match(path) {
        return true;
    }
    if HOOKS_PATTERN.is_match(path) {
        return true;
    }
    if SCRIPT_DIR_PATTERN.is_match(path) {
        return true;
    }
    if INDEX_FILE_PATTERN.is_match(path) {
        return true;
    }
    if MAIN_FILE_PATTERN.is_match(path) {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        parent_dir, ExportRecord, FileMetrics, ImportKind, ImportSpecifier,
    };
    use crate::graph::{DependencyGraph, Edge, EdgeKind};

    fn analyzed(path: &str, export_names: &[&str]) -> AnalyzedFile {
        AnalyzedFile {
            path: path.to_string(),
            directory: parent_dir(path),
            extension: path.rsplit('.').next().unwrap_or("").to_string(),
            size: 0,
            lines: 1,
            imports: Vec::new(),
            exports: export_names
                .iter()
                .enumerate()
                .map(|(idx, name)| ExportRecord {
                    name: name.to_string(),
                    kind: ExportKind::Function,
                    line: idx + 1,
                    source: None,
                })
                .collect(),
            functions: Vec::new(),
            classes: Vec::new(),
            calls: Vec::new(),
            metrics: FileMetrics::default(),
            parse_error: false,
        }
    }

    fn edge_with(source: &str, target: &str, names: &[&str]) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Import,
            specifiers: names
                .iter()
                .map(|n| ImportSpecifier {
                    local: n.to_string(),
                    imported: n.to_string(),
                    kind: ImportKind::Named,
                })
                .collect(),
            external: false,
            unresolved: false,
        }
    }

    fn graph(edges: Vec<Edge>) -> DependencyGraph {
        DependencyGraph {
            nodes: Vec::new(),
            edges,
        }
    }

    #[test]
    fn test_unreferenced_named_exports_flagged() {
        let files = vec![analyzed(
            "src/utils/math.js",
            &["add", "multiply", "clamp", "deprecatedHelper"],
        )];
        let g = graph(vec![edge_with(
            "src/a.js",
            "src/utils/math.js",
            &["multiply", "clamp"],
        )]);

        let dead = find_dead_exports(&g, &files);
        let names: Vec<&str> = dead.iter().map(|d| d.export.as_str()).collect();
        assert_eq!(names, vec!["add", "deprecatedHelper"]);
        assert!(dead.iter().all(|d| d.importer_count == 1));
    }

    #[test]
    fn test_namespace_import_marks_everything_used() {
        let files = vec![analyzed("src/api.js", &["fetch", "post"])];
        let g = graph(vec![edge_with("src/a.js", "src/api.js", &[])]);
        assert!(find_dead_exports(&g, &files).is_empty());
    }

    #[test]
    fn test_default_alias_survives_when_named_export_used() {
        let mut file = analyzed("src/widget.js", &["default", "render"]);
        file.exports[0].kind = ExportKind::Default;
        let g = graph(vec![edge_with("src/a.js", "src/widget.js", &["render"])]);

        let dead = find_dead_exports(&g, &[file]);
        assert!(dead.is_empty());
    }

    #[test]
    fn test_default_flagged_when_nothing_used() {
        let mut file = analyzed("src/widget.js", &["default", "render"]);
        file.exports[0].kind = ExportKind::Default;
        let g = graph(vec![edge_with("src/a.js", "src/widget.js", &["other"])]);

        let dead = find_dead_exports(&g, &[file]);
        let names: Vec<&str> = dead.iter().map(|d| d.export.as_str()).collect();
        assert_eq!(names, vec!["default", "render"]);
    }

    #[test]
    fn test_svelte_default_import_presumes_members_used() {
        let files = vec![analyzed("src/Card.svelte", &["attach", "detach"])];
        let g = graph(vec![edge_with("src/a.js", "src/Card.svelte", &["default"])]);
        assert!(find_dead_exports(&g, &files).is_empty());
    }

    #[test]
    fn test_entry_shaped_files_skipped() {
        let files = vec![
            analyzed("vite.config.js", &["plugin"]),
            analyzed("src/routes/+page.js", &["load"]),
            analyzed("src/app.test.js", &["helper"]),
        ];
        let g = graph(Vec::new());
        assert!(find_dead_exports(&g, &files).is_empty());
    }

    #[test]
    fn test_orphan_reasons() {
        let files = vec![
            analyzed("src/unused.js", &["helper"]),
            analyzed("src/scratch.js", &[]),
            analyzed("src/used.js", &["x"]),
        ];
        let g = graph(vec![edge_with("src/a.js", "src/used.js", &["x"])]);

        let orphans = find_orphan_files(&g, &files, &[]);
        assert_eq!(orphans.len(), 2);

        let by_file: HashMap<&str, &str> = orphans
            .iter()
            .map(|o| (o.file.as_str(), o.reason.as_str()))
            .collect();
        assert_eq!(by_file["src/unused.js"], "Not imported by any other file");
        assert_eq!(by_file["src/scratch.js"], "No exports and not imported");
    }

    #[test]
    fn test_route_files_not_orphans() {
        let files = vec![analyzed("src/custom/dashboard.js", &[])];
        let route = Route {
            path: "/dashboard".to_string(),
            file: "src/custom/dashboard.js".to_string(),
            kind: "page".to_string(),
            methods: Vec::new(),
            has_load: false,
            has_actions: false,
            params: Vec::new(),
        };
        let g = graph(Vec::new());
        assert!(find_orphan_files(&g, &files, &[route]).is_empty());
    }
}
