//! Modscope - static code intelligence for JS/TS module trees.
//!
//! Modscope parses JavaScript, TypeScript, and Svelte sources into
//! structural facts (imports, exports, functions, classes, call sites),
//! resolves module references into a file-level dependency graph, and runs
//! graph/metric analyses that surface architectural problems: dependency
//! cycles, dead exports, orphan files, complexity hotspots, and coupling
//! hubs.
//!
//! # Architecture
//!
//! Data flows one way through four stages:
//!
//! - `scan`: directory traversal with ignore rules → SourceFile snapshot
//! - `parser` + `analysis`: per-file parse and fact extraction
//!   (embarrassingly parallel; a failed parse degrades one file, never
//!   the run)
//! - `graph`: import resolution over the complete path universe
//! - `insights`: cycle, dead-code, complexity, and coupling engines over
//!   the finished graph
//!
//! `framework` and `routes` supply optional context (framework descriptor,
//! file-based routes); `report` renders the result as JSON or a terminal
//! summary.

pub mod analysis;
pub mod cli;
pub mod framework;
pub mod graph;
pub mod insights;
pub mod parser;
pub mod report;
pub mod routes;
pub mod scan;

pub use analysis::{analyze_file, AnalyzedFile};
pub use framework::Framework;
pub use graph::{BuildOptions, DependencyGraph};
pub use insights::InsightReport;
pub use report::{Report, ReportMeta, RunStats};
pub use routes::Route;
pub use scan::{scan_directory, ScanOptions, SourceFile};

use std::path::Path;

use rayon::prelude::*;

/// Options for a full analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Maximum directory depth to scan.
    pub depth: Option<usize>,
    /// Skip detection and force a framework name.
    pub framework: Option<String>,
    /// Emit external package nodes in the graph.
    pub include_external: bool,
}

/// Run the full pipeline over a directory.
///
/// Per-file analysis fans out across worker threads; completion order is
/// irrelevant because the results are re-sorted by path before graph
/// construction. Graph and insights run single-threaded after the join —
/// both need the complete file set.
pub fn analyze(root: &Path, options: &AnalyzeOptions) -> anyhow::Result<Report> {
    let files = scan_directory(root, ScanOptions { depth: options.depth })?;

    let mut analyzed: Vec<AnalyzedFile> = files.par_iter().map(analysis::analyze_file).collect();
    analyzed.sort_by(|a, b| a.path.cmp(&b.path));

    let framework = match &options.framework {
        Some(name) => Framework {
            name: name.clone(),
            version: None,
        },
        None => framework::detect_framework(root, &files),
    };

    let routes = if framework.name == "sveltekit" {
        routes::extract_routes(&files)
    } else {
        Vec::new()
    };

    let graph = graph::build(
        &analyzed,
        BuildOptions {
            include_external: options.include_external,
        },
    );
    let insights = insights::run_insights(&graph, &analyzed, &routes);
    let stats = RunStats::derive(&analyzed, &graph);

    Ok(Report {
        meta: ReportMeta::new(root, framework),
        files: analyzed,
        graph,
        routes,
        insights,
        stats,
    })
}
