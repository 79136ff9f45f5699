//! Circular dependency detection.
//!
//! Depth-first search over the internal edge subgraph with an on-stack set
//! and an explicit path stack: a back-edge to a node currently on the path
//! yields the stack slice from that node as a cycle. Cycles are normalized
//! by rotating the lexicographically smallest id to the front, then
//! re-closed, so the same cycle found from different entry points
//! deduplicates.
//!
//! Known limitation, kept deliberately: overlapping cycles sharing a node
//! are not guaranteed to all be enumerated — once a node is globally
//! visited it is not re-entered from another root.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::Severity;
use crate::graph::DependencyGraph;

/// One circular dependency, closed (first node repeated at the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Normalized node sequence, `a -> ... -> a`.
    pub cycle: Vec<String>,
    /// Number of distinct files involved.
    pub length: usize,
    /// Direct mutual imports (length <= 2) are errors, longer cycles
    /// warnings.
    pub severity: Severity,
}

/// Enumerate cycles over the internal edges, sorted ascending by length —
/// shorter cycles are the more problematic ones.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    // Sorted adjacency keeps traversal order deterministic.
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for edge in graph.internal_edges() {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut state = DfsState {
        adjacency: &adjacency,
        visited: HashSet::new(),
        on_stack: HashSet::new(),
        stack: Vec::new(),
        seen_keys: HashSet::new(),
        cycles: Vec::new(),
    };

    let roots: Vec<&str> = adjacency.keys().copied().collect();
    for root in roots {
        if !state.visited.contains(root) {
            state.dfs(root);
        }
    }

    let mut cycles = state.cycles;
    cycles.sort_by_key(|c| c.length);
    cycles
}

struct DfsState<'a> {
    adjacency: &'a BTreeMap<&'a str, Vec<&'a str>>,
    visited: HashSet<&'a str>,
    on_stack: HashSet<&'a str>,
    stack: Vec<&'a str>,
    seen_keys: HashSet<String>,
    cycles: Vec<Cycle>,
}

impl<'a> DfsState<'a> {
    fn dfs(&mut self, node: &'a str) {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.stack.push(node);

        let neighbors = self
            .adjacency
            .get(node)
            .map(|n| n.as_slice())
            .unwrap_or_default()
            .to_vec();
        for next in neighbors {
            if !self.visited.contains(next) {
                self.dfs(next);
            } else if self.on_stack.contains(next) {
                if let Some(start) = self.stack.iter().position(|&n| n == next) {
                    let cycle: Vec<&str> = self.stack[start..].to_vec();
                    self.record(cycle);
                }
            }
        }

        self.stack.pop();
        self.on_stack.remove(node);
    }

    fn record(&mut self, cycle: Vec<&str>) {
        let normalized = normalize(&cycle);
        let key = normalized.join(" -> ");
        if !self.seen_keys.insert(key) {
            return;
        }

        let length = normalized.len();
        let mut closed: Vec<String> = normalized.into_iter().map(String::from).collect();
        closed.push(closed[0].clone());

        self.cycles.push(Cycle {
            cycle: closed,
            length,
            severity: if length <= 2 {
                Severity::Error
            } else {
                Severity::Warning
            },
        });
    }
}

/// Rotate so the lexicographically smallest node comes first.
fn normalize<'a>(nodes: &[&'a str]) -> Vec<&'a str> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let mut min_idx = 0;
    for (idx, node) in nodes.iter().enumerate().skip(1) {
        if *node < nodes[min_idx] {
            min_idx = idx;
        }
    }
    let mut rotated = Vec::with_capacity(nodes.len());
    rotated.extend_from_slice(&nodes[min_idx..]);
    rotated.extend_from_slice(&nodes[..min_idx]);
    rotated
}
