//! Insight engines over the dependency graph and per-file facts.
//!
//! Every engine needs the complete edge set before producing anything —
//! the pipeline is strictly collect-all, then analyze. Streaming variants
//! would misclassify hubs and orphans.

mod complexity;
mod coupling;
mod cycles;
mod dead_code;

pub use complexity::{
    find_complexity_issues, ComplexFile, ComplexFunction, ComplexityInsights, Hotspot,
};
pub use coupling::{analyze_coupling, CouplingInsights, CouplingRecord, HighCoupling, HubCandidate};
pub use cycles::{find_cycles, Cycle};
pub use dead_code::{find_dead_exports, find_orphan_files, DeadExport, OrphanFile};

use serde::{Deserialize, Serialize};

use crate::analysis::AnalyzedFile;
use crate::graph::DependencyGraph;
use crate::routes::Route;

/// Severity of a structural finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// All insight results for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub circular: Vec<Cycle>,
    pub dead_exports: Vec<DeadExport>,
    pub orphans: Vec<OrphanFile>,
    pub complexity: ComplexityInsights,
    pub coupling: CouplingInsights,
}

/// Run every insight engine over the finished graph.
pub fn run_insights(
    graph: &DependencyGraph,
    files: &[AnalyzedFile],
    routes: &[Route],
) -> InsightReport {
    InsightReport {
        circular: find_cycles(graph),
        dead_exports: find_dead_exports(graph, files),
        orphans: find_orphan_files(graph, files, routes),
        complexity: find_complexity_issues(files),
        coupling: analyze_coupling(graph),
    }
}

/// One-line issue summaries for the terminal report.
pub fn summarize_insights(insights: &InsightReport) -> Vec<String> {
    let mut issues = Vec::new();

    if !insights.circular.is_empty() {
        let errors = insights
            .circular
            .iter()
            .filter(|c| c.severity == Severity::Error)
            .count();
        issues.push(format!(
            "{} circular dependencies ({} critical)",
            insights.circular.len(),
            errors
        ));
    }
    if !insights.dead_exports.is_empty() {
        issues.push(format!("{} unused exports", insights.dead_exports.len()));
    }
    if !insights.orphans.is_empty() {
        issues.push(format!("{} orphan files", insights.orphans.len()));
    }
    if !insights.complexity.complex_files.is_empty() {
        issues.push(format!(
            "{} complex files",
            insights.complexity.complex_files.len()
        ));
    }
    if !insights.coupling.high_coupling.is_empty() {
        issues.push(format!(
            "{} high-coupling files",
            insights.coupling.high_coupling.len()
        ));
    }

    issues
}
