//! Afferent/efferent coupling analysis.
//!
//! Afferent = distinct internal files depending on a file (risk when it
//! changes); efferent = distinct internal files it depends on (exposure to
//! change). Instability is efferent / (afferent + efferent): 0 is
//! maximally stable, 1 maximally unstable.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::graph::{DependencyGraph, NodeKind};

/// Total coupling above this flags a file.
pub const HIGH_COUPLING_THRESHOLD: usize = 15;
/// Both sides at or above this floor makes a hub candidate.
pub const HUB_FLOOR: usize = 5;

/// Coupling measures for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingRecord {
    pub file: String,
    pub afferent: usize,
    pub efferent: usize,
    pub instability: f64,
}

/// A file whose total coupling crossed the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighCoupling {
    pub file: String,
    pub total: usize,
    pub reason: String,
}

/// A file with both high afferent and high efferent coupling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubCandidate {
    pub file: String,
    pub dependents: usize,
    pub dependencies: usize,
}

/// All coupling findings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouplingInsights {
    /// Per-file records, highest total coupling first.
    pub files: Vec<CouplingRecord>,
    pub high_coupling: Vec<HighCoupling>,
    pub hubs: Vec<HubCandidate>,
}

/// Compute coupling over the internal node set.
pub fn analyze_coupling(graph: &DependencyGraph) -> CouplingInsights {
    let mut afferent: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    let mut efferent: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();

    for node in &graph.nodes {
        if node.kind == NodeKind::External {
            continue;
        }
        afferent.entry(node.id.as_str()).or_default();
        efferent.entry(node.id.as_str()).or_default();
    }

    for edge in graph.internal_edges() {
        efferent
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.as_str());
        afferent
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }

    let mut files = Vec::new();
    let mut high_coupling = Vec::new();
    let mut hubs = Vec::new();

    for node in &graph.nodes {
        if node.kind == NodeKind::External {
            continue;
        }
        let ca = afferent.get(node.id.as_str()).map(|s| s.len()).unwrap_or(0);
        let ce = efferent.get(node.id.as_str()).map(|s| s.len()).unwrap_or(0);
        let total = ca + ce;

        let instability = if total > 0 {
            ((ce as f64 / total as f64) * 100.0).round() / 100.0
        } else {
            0.0
        };

        files.push(CouplingRecord {
            file: node.id.clone(),
            afferent: ca,
            efferent: ce,
            instability,
        });

        if total > HIGH_COUPLING_THRESHOLD {
            let reason = if ca > ce * 2 {
                format!("Hub: {} dependents - risky to change", ca)
            } else if ce > ca * 2 {
                format!("High dependency count: imports {} modules", ce)
            } else {
                format!("High total coupling: {} in + {} out", ca, ce)
            };
            high_coupling.push(HighCoupling {
                file: node.id.clone(),
                total,
                reason,
            });
        }

        // both heavily depended on and heavily depending
        if ca >= HUB_FLOOR && ce >= HUB_FLOOR {
            hubs.push(HubCandidate {
                file: node.id.clone(),
                dependents: ca,
                dependencies: ce,
            });
        }
    }

    files.sort_by(|a, b| {
        (b.afferent + b.efferent)
            .cmp(&(a.afferent + a.efferent))
            .then_with(|| a.file.cmp(&b.file))
    });
    high_coupling.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.file.cmp(&b.file)));
    hubs.sort_by(|a, b| {
        (b.dependents + b.dependencies)
            .cmp(&(a.dependents + a.dependencies))
            .then_with(|| a.file.cmp(&b.file))
    });

    CouplingInsights {
        files,
        high_coupling,
        hubs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencyGraph, Edge, EdgeKind, Node, NodeMetrics};

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            directory: ".".to_string(),
            kind: NodeKind::Source,
            metrics: NodeMetrics {
                complexity: 1,
                maintainability: 100.0,
                in_degree: 0,
                out_degree: 0,
            },
        }
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            kind: EdgeKind::Import,
            specifiers: Vec::new(),
            external: false,
            unresolved: false,
        }
    }

    /// A star around `hub.js`: `spokes` importers and `deps` imports.
    fn star_graph(spokes: usize, deps: usize) -> DependencyGraph {
        let mut nodes = vec![node("hub.js")];
        let mut edges = Vec::new();
        for i in 0..spokes {
            let id = format!("in{}.js", i);
            nodes.push(node(&id));
            edges.push(edge(&id, "hub.js"));
        }
        for i in 0..deps {
            let id = format!("out{}.js", i);
            nodes.push(node(&id));
            edges.push(edge("hub.js", &id));
        }
        DependencyGraph { nodes, edges }
    }

    #[test]
    fn test_afferent_efferent_counts() {
        let g = star_graph(2, 3);
        let insights = analyze_coupling(&g);
        let hub = insights.files.iter().find(|f| f.file == "hub.js").unwrap();
        assert_eq!(hub.afferent, 2);
        assert_eq!(hub.efferent, 3);
        assert_eq!(hub.instability, 0.6);
    }

    #[test]
    fn test_instability_zero_when_uncoupled() {
        let g = DependencyGraph {
            nodes: vec![node("lone.js")],
            edges: Vec::new(),
        };
        let insights = analyze_coupling(&g);
        assert_eq!(insights.files[0].instability, 0.0);
    }

    #[test]
    fn test_hub_candidate_at_floor() {
        let g = star_graph(6, 6);
        let insights = analyze_coupling(&g);
        assert_eq!(insights.hubs.len(), 1);
        assert_eq!(insights.hubs[0].file, "hub.js");
        assert_eq!(insights.hubs[0].dependents, 6);
        assert_eq!(insights.hubs[0].dependencies, 6);
    }

    #[test]
    fn test_below_floor_is_not_hub() {
        let g = star_graph(6, 4);
        let insights = analyze_coupling(&g);
        assert!(insights.hubs.is_empty());
    }

    #[test]
    fn test_high_coupling_classification() {
        // 12 dependents, 4 dependencies: total 16 > 15, ca > 2*ce
        let g = star_graph(12, 4);
        let insights = analyze_coupling(&g);
        assert_eq!(insights.high_coupling.len(), 1);
        assert!(insights.high_coupling[0].reason.starts_with("Hub:"));

        // reversed: efferent-heavy
        let g = star_graph(4, 12);
        let insights = analyze_coupling(&g);
        assert!(insights.high_coupling[0]
            .reason
            .starts_with("High dependency count"));

        // balanced: 9 + 9 = 18
        let g = star_graph(9, 9);
        let insights = analyze_coupling(&g);
        assert!(insights.high_coupling[0]
            .reason
            .starts_with("High total coupling"));
    }

    #[test]
    fn test_distinct_importers_counted_once() {
        let g = DependencyGraph {
            nodes: vec![node("a.js"), node("b.js")],
            edges: vec![edge("a.js", "b.js"), edge("a.js", "b.js")],
        };
        let insights = analyze_coupling(&g);
        let b = insights.files.iter().find(|f| f.file == "b.js").unwrap();
        assert_eq!(b.afferent, 1);
    }
}
