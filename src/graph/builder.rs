//! Graph construction: import resolution and node/edge emission.
//!
//! Resolution is pure and per-run: the alias table and known-directory set
//! are derived once from the observed path universe, never cached across
//! runs. Unresolved imports are not errors — the edge stays, flagged, so
//! the graph remains usable even for malformed projects.

use std::collections::{BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DependencyGraph, Edge, EdgeKind, Node, NodeKind, NodeMetrics};
use crate::analysis::{parent_dir, AnalyzedFile, ImportRecord};

/// Extensions tried when a specifier omits one, in priority order.
const RESOLVE_EXTENSIONS: &[&str] = &[".js", ".ts", ".mjs", ".jsx", ".tsx", ".svelte"];

static ENTRY_SCRIPT_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(bin|scripts)/").unwrap());
static ENTRY_MAIN_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(index|main|app|server)\.(js|ts|mjs)$").unwrap());

/// Options for graph construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Emit a node per external package (deduplicated by package name).
    pub include_external: bool,
}

/// Result of resolving one import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved file path, package name, or literal computed target.
    pub target: String,
    pub external: bool,
    pub unresolved: bool,
}

/// Build the dependency graph from the complete set of analyzed files.
pub fn build(files: &[AnalyzedFile], options: BuildOptions) -> DependencyGraph {
    let all_paths: HashSet<&str> = files.iter().map(|f| f.path.as_str()).collect();
    let aliases = detect_aliases(&all_paths);

    let known_dirs: HashSet<&str> = files
        .iter()
        .filter_map(|f| f.path.split('/').next())
        .collect();

    let mut edges = Vec::new();
    let mut external_packages = BTreeSet::new();
    let mut in_degree: HashMap<String, usize> = HashMap::new();
    let mut out_degree: HashMap<String, usize> = HashMap::new();

    for file in files {
        out_degree.entry(file.path.clone()).or_insert(0);
        in_degree.entry(file.path.clone()).or_insert(0);

        for import in &file.imports {
            let resolution = resolve_import(&import.source, &file.path, &all_paths, &aliases, &known_dirs);

            if resolution.external {
                // framework built-ins come back external+unresolved and
                // never become nodes
                if !resolution.unresolved {
                    external_packages.insert(resolution.target.clone());
                }
            } else {
                *in_degree.entry(resolution.target.clone()).or_insert(0) += 1;
            }
            *out_degree.entry(file.path.clone()).or_insert(0) += 1;

            edges.push(Edge {
                source: file.path.clone(),
                target: resolution.target,
                kind: edge_kind(import),
                specifiers: import.specifiers.clone(),
                external: resolution.external,
                unresolved: resolution.unresolved,
            });
        }
    }

    let mut nodes = Vec::new();
    for file in files {
        let in_deg = in_degree.get(&file.path).copied().unwrap_or(0);
        let out_deg = out_degree.get(&file.path).copied().unwrap_or(0);

        nodes.push(Node {
            id: file.path.clone(),
            directory: file.directory.clone(),
            kind: classify_file(&file.path, in_deg),
            metrics: NodeMetrics {
                complexity: file.metrics.complexity,
                maintainability: file.metrics.maintainability,
                in_degree: in_deg,
                out_degree: out_deg,
            },
        });
    }

    if options.include_external {
        for package in external_packages {
            nodes.push(Node {
                id: package,
                directory: "node_modules".to_string(),
                kind: NodeKind::External,
                metrics: NodeMetrics {
                    complexity: 0,
                    maintainability: 100.0,
                    in_degree: 0,
                    out_degree: 0,
                },
            });
        }
    }

    DependencyGraph { nodes, edges }
}

fn edge_kind(import: &ImportRecord) -> EdgeKind {
    if import.is_dynamic {
        EdgeKind::Dynamic
    } else if import.is_re_export {
        EdgeKind::ReExport
    } else {
        EdgeKind::Import
    }
}

/// Alias table derived from observed path shapes. `None` targets mean
/// framework built-ins: external, unresolved, never a node.
fn detect_aliases(all_paths: &HashSet<&str>) -> Vec<(&'static str, Option<String>)> {
    let has_lib = all_paths.iter().any(|p| p.starts_with("lib/"));
    let has_src_lib = all_paths.iter().any(|p| p.starts_with("src/lib/"));
    let lib_prefix = if has_src_lib {
        "src/lib"
    } else if has_lib {
        "lib"
    } else {
        "src/lib"
    };

    let has_src = all_paths.iter().any(|p| p.starts_with("src/"));
    let src_prefix = if has_src { "src" } else { "." };

    vec![
        ("$lib", Some(lib_prefix.to_string())),
        ("$app", None),
        ("$env", None),
        ("~", Some(src_prefix.to_string())),
        ("@", Some(src_prefix.to_string())),
    ]
}

/// Resolve one import specifier from the importing file's position.
pub fn resolve_import(
    specifier: &str,
    from_file: &str,
    all_paths: &HashSet<&str>,
    aliases: &[(&'static str, Option<String>)],
    known_dirs: &HashSet<&str>,
) -> Resolution {
    let mut source = specifier.to_string();

    if !source.starts_with('.') && !source.starts_with('/') {
        for (alias, target) in aliases {
            if source == *alias || source.starts_with(&format!("{}/", alias)) {
                match target {
                    None => {
                        return Resolution {
                            target: source,
                            external: true,
                            unresolved: true,
                        }
                    }
                    Some(prefix) => {
                        let rest = &source[alias.len()..];
                        source = format!("{}{}", prefix, rest);
                        break;
                    }
                }
            }
        }

        // A leading segment outside the project tree means a package.
        if !source.starts_with('.') {
            let first_segment = source.split('/').next().unwrap_or("");
            if !known_dirs.contains(first_segment) {
                let package = if source.starts_with('@') {
                    source.split('/').take(2).collect::<Vec<_>>().join("/")
                } else {
                    first_segment.to_string()
                };
                return Resolution {
                    target: package,
                    external: true,
                    unresolved: false,
                };
            }
        }
    }

    let target = if source.starts_with('.') {
        join_relative(&parent_dir(from_file), &source)
    } else {
        source
    };

    if all_paths.contains(target.as_str()) {
        return Resolution {
            target,
            external: false,
            unresolved: false,
        };
    }

    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{}{}", target, ext);
        if all_paths.contains(candidate.as_str()) {
            return Resolution {
                target: candidate,
                external: false,
                unresolved: false,
            };
        }
    }

    for ext in RESOLVE_EXTENSIONS {
        let candidate = format!("{}/index{}", target, ext);
        if all_paths.contains(candidate.as_str()) {
            return Resolution {
                target: candidate,
                external: false,
                unresolved: false,
            };
        }
    }

    Resolution {
        target,
        external: false,
        unresolved: true,
    }
}

/// Join a relative specifier onto a directory, normalizing `.` and `..`
/// segments of a forward-slash repo path.
fn join_relative(dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = if dir == "." || dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Entry points are files nothing should import: route/page trees, script
/// directories, conventional main files.
fn classify_file(path: &str, in_degree: usize) -> NodeKind {
    if in_degree == 0 {
        if path.contains("routes/") || path.contains("pages/") {
            return NodeKind::Entry;
        }
        if ENTRY_SCRIPT_DIR.is_match(path) {
            return NodeKind::Entry;
        }
        if ENTRY_MAIN_FILE.is_match(path) {
            return NodeKind::Entry;
        }
    }
    NodeKind::Source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FileMetrics, ImportKind, ImportSpecifier};

    fn analyzed(path: &str, imports: Vec<ImportRecord>) -> AnalyzedFile {
        AnalyzedFile {
            path: path.to_string(),
            directory: parent_dir(path),
            extension: path.rsplit('.').next().unwrap_or("").to_string(),
            size: 0,
            lines: 1,
            imports,
            exports: Vec::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            calls: Vec::new(),
            metrics: FileMetrics::default(),
            parse_error: false,
        }
    }

    fn import(source: &str) -> ImportRecord {
        ImportRecord {
            source: source.to_string(),
            specifiers: vec![ImportSpecifier {
                local: "x".to_string(),
                imported: "x".to_string(),
                kind: ImportKind::Named,
            }],
            line: 1,
            is_re_export: false,
            is_dynamic: false,
        }
    }

    fn resolve(specifier: &str, from: &str, paths: &[&str]) -> Resolution {
        let all: HashSet<&str> = paths.iter().copied().collect();
        let aliases = detect_aliases(&all);
        let known: HashSet<&str> = paths.iter().filter_map(|p| p.split('/').next()).collect();
        resolve_import(specifier, from, &all, &aliases, &known)
    }

    #[test]
    fn test_resolve_exact_and_extension() {
        let paths = ["src/a.js", "src/utils/math.js"];
        let r = resolve("./utils/math.js", "src/a.js", &paths);
        assert_eq!(r.target, "src/utils/math.js");
        assert!(!r.external);
        assert!(!r.unresolved);

        let r = resolve("./utils/math", "src/a.js", &paths);
        assert_eq!(r.target, "src/utils/math.js");
    }

    #[test]
    fn test_resolve_directory_index() {
        let paths = ["src/a.js", "src/store/index.ts"];
        let r = resolve("./store", "src/a.js", &paths);
        assert_eq!(r.target, "src/store/index.ts");
    }

    #[test]
    fn test_resolve_parent_traversal() {
        let paths = ["src/components/Button.js", "src/utils/format.js"];
        let r = resolve("../utils/format.js", "src/components/Button.js", &paths);
        assert_eq!(r.target, "src/utils/format.js");
    }

    #[test]
    fn test_external_package_and_scoped_name() {
        let paths = ["src/a.js"];
        let r = resolve("svelte/store", "src/a.js", &paths);
        assert!(r.external);
        assert_eq!(r.target, "svelte");

        let r = resolve("@sveltejs/kit", "src/a.js", &paths);
        assert!(r.external);
        assert_eq!(r.target, "@sveltejs/kit");
    }

    #[test]
    fn test_lib_alias_resolves_to_existing_layout() {
        let paths = ["src/a.js", "src/lib/api.js"];
        let r = resolve("$lib/api.js", "src/a.js", &paths);
        assert_eq!(r.target, "src/lib/api.js");
        assert!(!r.external);
    }

    #[test]
    fn test_builtin_alias_is_external_unresolved() {
        let paths = ["src/a.js"];
        let r = resolve("$app/stores", "src/a.js", &paths);
        assert!(r.external);
        assert!(r.unresolved);
    }

    #[test]
    fn test_at_alias_targets_src() {
        let paths = ["src/a.js", "src/utils/http.js"];
        let r = resolve("@/utils/http.js", "src/a.js", &paths);
        assert_eq!(r.target, "src/utils/http.js");
    }

    #[test]
    fn test_unresolved_keeps_literal_target() {
        let paths = ["src/a.js"];
        let r = resolve("./missing", "src/a.js", &paths);
        assert!(r.unresolved);
        assert!(!r.external);
        assert_eq!(r.target, "src/missing");
    }

    #[test]
    fn test_build_degrees_and_invariant() {
        let files = vec![
            analyzed("src/a.js", vec![import("./b.js"), import("./gone.js")]),
            analyzed("src/b.js", vec![]),
        ];
        let graph = build(&files, BuildOptions::default());

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 2);

        let a = graph.node("src/a.js").unwrap();
        assert_eq!(a.metrics.out_degree, 2);
        let b = graph.node("src/b.js").unwrap();
        assert_eq!(b.metrics.in_degree, 1);

        // every internal edge target is a node id or flagged unresolved
        let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in graph.internal_edges() {
            assert!(
                node_ids.contains(edge.target.as_str()) || edge.unresolved,
                "edge target {} neither node nor unresolved",
                edge.target
            );
        }
    }

    #[test]
    fn test_entry_classification() {
        let files = vec![
            analyzed("src/routes/+page.js", vec![]),
            analyzed("scripts/migrate.js", vec![]),
            analyzed("src/main.ts", vec![]),
            analyzed("src/helpers.js", vec![]),
        ];
        let graph = build(&files, BuildOptions::default());
        assert_eq!(graph.node("src/routes/+page.js").unwrap().kind, NodeKind::Entry);
        assert_eq!(graph.node("scripts/migrate.js").unwrap().kind, NodeKind::Entry);
        assert_eq!(graph.node("src/main.ts").unwrap().kind, NodeKind::Entry);
        assert_eq!(graph.node("src/helpers.js").unwrap().kind, NodeKind::Source);
    }

    #[test]
    fn test_external_nodes_deduplicated() {
        let files = vec![
            analyzed("src/a.js", vec![import("svelte"), import("svelte/store")]),
            analyzed("src/b.js", vec![import("svelte")]),
        ];
        let graph = build(
            &files,
            BuildOptions {
                include_external: true,
            },
        );
        let external: Vec<_> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::External)
            .collect();
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].id, "svelte");
    }
}
