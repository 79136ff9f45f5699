//! Output formatting for analysis results.
//!
//! Two surfaces: a JSON document for programmatic consumption and a
//! colored terminal summary. The analysis payload (files, graph, routes,
//! insights, stats) is fully deterministic; the only per-run value is the
//! timestamp in the meta envelope.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use colored::*;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalyzedFile;
use crate::framework::Framework;
use crate::graph::DependencyGraph;
use crate::insights::{summarize_insights, InsightReport, Severity};
use crate::routes::Route;

/// Report envelope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Project name (root directory basename).
    pub name: String,
    /// Absolute root the scan ran over.
    pub root: String,
    pub framework: Framework,
    /// Unix seconds; the one non-deterministic field of the report.
    pub generated_at: u64,
    pub version: String,
}

/// Run statistics over the full result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub total_files: usize,
    pub total_functions: usize,
    pub total_dependencies: usize,
    pub total_exports: usize,
    pub parse_errors: usize,
}

impl RunStats {
    /// Derive stats from the finished pipeline outputs.
    pub fn derive(files: &[AnalyzedFile], graph: &DependencyGraph) -> Self {
        Self {
            total_files: files.len(),
            total_functions: files.iter().map(|f| f.functions.len()).sum(),
            total_dependencies: graph.edges.len(),
            total_exports: files.iter().map(|f| f.exports.len()).sum(),
            parse_errors: files.iter().filter(|f| f.parse_error).count(),
        }
    }
}

/// The complete serializable result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub files: Vec<AnalyzedFile>,
    pub graph: DependencyGraph,
    pub routes: Vec<Route>,
    pub insights: InsightReport,
    pub stats: RunStats,
}

impl ReportMeta {
    pub fn new(root: &Path, framework: Framework) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        let generated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            name,
            root: root.display().to_string(),
            framework,
            generated_at,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Serialize the report as pretty-printed JSON.
pub fn to_json(report: &Report) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the JSON report to a file.
pub fn write_json(report: &Report, output: &Path) -> anyhow::Result<()> {
    std::fs::write(output, to_json(report)?)?;
    Ok(())
}

/// How many findings each pretty-print section shows.
const PRETTY_SECTION_LIMIT: usize = 5;

/// Print the colored terminal summary.
pub fn print_pretty(report: &Report) {
    let stats = &report.stats;

    println!();
    println!("{}", "Summary:".bold());
    println!("  Files:        {}", stats.total_files);
    println!("  Functions:    {}", stats.total_functions);
    println!("  Dependencies: {}", stats.total_dependencies);
    println!("  Exports:      {}", stats.total_exports);
    if stats.parse_errors > 0 {
        println!(
            "  Parse errors: {}",
            stats.parse_errors.to_string().yellow()
        );
    }

    let issues = summarize_insights(&report.insights);
    if issues.is_empty() {
        println!("\n{}", "No structural issues found.".green());
        return;
    }

    println!("\n{}", "Issues:".bold());
    for issue in &issues {
        println!("  {} {}", "•".yellow(), issue);
    }

    if !report.insights.circular.is_empty() {
        println!("\n{}", "Circular dependencies:".bold());
        for cycle in report.insights.circular.iter().take(PRETTY_SECTION_LIMIT) {
            let marker = match cycle.severity {
                Severity::Error => "error".red(),
                Severity::Warning => "warning".yellow(),
            };
            println!("  [{}] {}", marker, cycle.cycle.join(" -> "));
        }
        print_truncation(report.insights.circular.len());
    }

    if !report.insights.dead_exports.is_empty() {
        println!("\n{}", "Unused exports:".bold());
        for dead in report.insights.dead_exports.iter().take(PRETTY_SECTION_LIMIT) {
            println!(
                "  {}:{} {}",
                dead.file,
                dead.line,
                dead.export.as_str().cyan()
            );
        }
        print_truncation(report.insights.dead_exports.len());
    }

    if !report.insights.orphans.is_empty() {
        println!("\n{}", "Orphan files:".bold());
        for orphan in report.insights.orphans.iter().take(PRETTY_SECTION_LIMIT) {
            println!("  {} {}", orphan.file, orphan.reason.dimmed());
        }
        print_truncation(report.insights.orphans.len());
    }

    if !report.insights.complexity.hotspots.is_empty() {
        println!("\n{}", "Hotspots:".bold());
        for hotspot in report
            .insights
            .complexity
            .hotspots
            .iter()
            .take(PRETTY_SECTION_LIMIT)
        {
            println!(
                "  {:.2}  {} {}",
                hotspot.score,
                hotspot.file,
                format!("({})", hotspot.reason).dimmed()
            );
        }
    }
}

fn print_truncation(total: usize) {
    if total > PRETTY_SECTION_LIMIT {
        println!("  {}", format!("... and {} more", total - PRETTY_SECTION_LIMIT).dimmed());
    }
}
