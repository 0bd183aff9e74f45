//! Similarity graph construction
//!
//! Nodes are code units, edges are blended similarity scores at or above the
//! edge threshold. The graph is simple (one edge per ordered pair) and never
//! holds self-loops.

use petgraph::graph::NodeIndex;
use petgraph::{Directed, Graph};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod edges;
pub mod metrics;

pub use edges::SimilarityEdge;
pub use metrics::{apply_metrics, assign_disparity, assign_edge_betweenness, edge_betweenness};

use crate::models::CodeUnit;
use crate::similarity::SimilarityScorer;
use crate::DiscoveryConfig;

/// Weighted similarity digraph over code units
pub type SimilarityGraph = Graph<CodeUnit, SimilarityEdge, Directed>;

/// Builds a [`SimilarityGraph`] from a flat unit list
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    threshold: f64,
    parallel: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl GraphBuilder {
    /// Create a sequential builder with the given edge threshold
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            parallel: false,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            threshold: config.edge_threshold,
            parallel: config.parallel_processing,
        }
    }

    /// Score pairs on the rayon pool
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every ordered pair of distinct units and keep the edges at or
    /// above the threshold. Node indices follow the order of `units`.
    pub fn build(&self, units: &[CodeUnit]) -> SimilarityGraph {
        let scorer = SimilarityScorer::new(units, self.parallel);

        let mut graph = SimilarityGraph::with_capacity(units.len(), 0);
        let nodes: Vec<NodeIndex> = units.iter().map(|u| graph.add_node(u.clone())).collect();

        let outgoing = |source: usize| -> Vec<(usize, f64)> {
            units
                .iter()
                .enumerate()
                .filter(|&(target, _)| target != source)
                .filter_map(|(target, unit)| {
                    let weight = scorer.combined_weight(&units[source], unit);
                    (weight >= self.threshold).then_some((target, weight))
                })
                .collect()
        };
        let edge_lists: Vec<Vec<(usize, f64)>> = if self.parallel {
            (0..units.len()).into_par_iter().map(outgoing).collect()
        } else {
            (0..units.len()).map(outgoing).collect()
        };

        for (source, targets) in edge_lists.into_iter().enumerate() {
            for (target, weight) in targets {
                graph.add_edge(nodes[source], nodes[target], SimilarityEdge::new(weight));
            }
        }

        info!(
            "Built similarity graph: {} units, {} distinct paths, {} edges",
            graph.node_count(),
            scorer.path_matrix().len(),
            graph.edge_count()
        );
        graph
    }
}

/// Subgraph induced by `members`, keeping edge payloads and node order
pub fn induced_subgraph(graph: &SimilarityGraph, members: &[NodeIndex]) -> SimilarityGraph {
    let mut keep = vec![false; graph.node_count()];
    for member in members {
        if let Some(slot) = keep.get_mut(member.index()) {
            *slot = true;
        }
    }

    graph.filter_map(
        |index, unit| keep[index.index()].then(|| unit.clone()),
        |_, edge| Some(*edge),
    )
}

/// Individual graph statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes
    pub node_count: usize,
    /// Number of edges
    pub edge_count: usize,
    /// Graph density (edges / max_possible_edges)
    pub density: f64,
    /// Mean edge weight (0 without edges)
    pub mean_weight: f64,
}

impl GraphStats {
    pub fn of(graph: &SimilarityGraph) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let possible = node_count.saturating_mul(node_count.saturating_sub(1));
        let density = if possible > 0 {
            edge_count as f64 / possible as f64
        } else {
            0.0
        };
        let mean_weight = if edge_count > 0 {
            graph.edge_weights().map(|e| e.weight).sum::<f64>() / edge_count as f64
        } else {
            0.0
        };

        let stats = Self {
            node_count,
            edge_count,
            density,
            mean_weight,
        };
        debug!("Graph stats: {stats:?}");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;

    fn units() -> Vec<CodeUnit> {
        let user = CodeUnit::new("u1", "getUser", UnitKind::Function, "src/user.ts");
        let profile = CodeUnit::new("u2", "getUserProfile", UnitKind::Function, "src/user.ts")
            .with_dependency(&user);
        let login = CodeUnit::new("a1", "login", UnitKind::Function, "auth/login.ts");
        vec![user, profile, login]
    }

    #[test]
    fn test_build_creates_scenario_edges() {
        let units = units();
        let graph = GraphBuilder::new(0.33).build(&units);

        assert_eq!(graph.node_count(), 3);
        let forward = graph.find_edge(NodeIndex::new(0), NodeIndex::new(1));
        let backward = graph.find_edge(NodeIndex::new(1), NodeIndex::new(0));
        assert!(forward.is_some());
        assert!(backward.is_some());

        // `login` joins the corpus, so idf values differ from a two-unit corpus
        let forward_weight = forward.map(|e| graph[e].weight).unwrap_or_default();
        let backward_weight = backward.map(|e| graph[e].weight).unwrap_or_default();
        assert!((forward_weight - 0.586).abs() < 1e-3);
        assert!((backward_weight - 0.920).abs() < 1e-3);
        assert!(backward_weight > forward_weight);

        // login scores about 0.26 against both user units
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_no_self_loops_even_at_zero_threshold() {
        let graph = GraphBuilder::new(0.0).build(&units());

        assert_eq!(graph.edge_count(), 6);
        for edge in graph.raw_edges() {
            assert_ne!(edge.source(), edge.target());
        }
    }

    #[test]
    fn test_parallel_build_matches_sequential() {
        let units = units();
        let sequential = GraphBuilder::new(0.33).build(&units);
        let parallel = GraphBuilder::new(0.33).with_parallel(true).build(&units);

        assert_eq!(sequential.edge_count(), parallel.edge_count());
        for (a, b) in sequential.raw_edges().iter().zip(parallel.raw_edges()) {
            assert_eq!(a.source(), b.source());
            assert_eq!(a.target(), b.target());
            assert_eq!(a.weight, b.weight);
        }
    }

    #[test]
    fn test_induced_subgraph_keeps_internal_edges() {
        let graph = GraphBuilder::new(0.0).build(&units());
        let sub = induced_subgraph(&graph, &[NodeIndex::new(0), NodeIndex::new(2)]);

        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 2);
        assert_eq!(sub[NodeIndex::new(0)].name, "getUser");
        assert_eq!(sub[NodeIndex::new(1)].name, "login");
    }

    #[test]
    fn test_graph_stats() {
        let stats = GraphStats::of(&GraphBuilder::new(0.0).build(&units()));
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 6);
        assert!((stats.density - 1.0).abs() < f64::EPSILON);
        assert!(stats.mean_weight > 0.0);

        let empty = GraphStats::of(&SimilarityGraph::new());
        assert!(empty.density.abs() < f64::EPSILON);
        assert!(empty.mean_weight.abs() < f64::EPSILON);
    }
}
