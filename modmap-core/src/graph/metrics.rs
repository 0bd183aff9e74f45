//! Edge metrics that bias community detection
//!
//! Disparity measures how much an edge dominates the strength of its
//! endpoints. Edge betweenness, computed over disparity, marks the bridges
//! between dense regions.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rayon::prelude::*;
use tracing::debug;

use super::SimilarityGraph;

/// Distances closer than this count as the same shortest-path length
const DISTANCE_TOLERANCE: f64 = 1e-12;

/// Set `disparity` on every edge.
///
/// For an edge `u -> v` with weight `w` the disparity is
/// `min((1 - w/s_out(u))^(k_out(u) - 1), (1 - w/s_in(v))^(k_in(v) - 1))`
/// where `s` is the summed weight and `k` the edge count on that side.
pub fn assign_disparity(graph: &mut SimilarityGraph) {
    let n = graph.node_count();
    let mut out_strength = vec![0.0; n];
    let mut in_strength = vec![0.0; n];
    let mut out_degree = vec![0usize; n];
    let mut in_degree = vec![0usize; n];

    for edge in graph.raw_edges() {
        let (s, t) = (edge.source().index(), edge.target().index());
        out_strength[s] += edge.weight.weight;
        in_strength[t] += edge.weight.weight;
        out_degree[s] += 1;
        in_degree[t] += 1;
    }

    let edges: Vec<EdgeIndex> = graph.edge_indices().collect();
    for edge in edges {
        let Some((source, target)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let (s, t) = (source.index(), target.index());
        let weight = graph[edge].weight;

        let out_side = significance(weight, out_strength[s], out_degree[s]);
        let in_side = significance(weight, in_strength[t], in_degree[t]);
        graph[edge].disparity = out_side.min(in_side);
    }
}

fn significance(weight: f64, strength: f64, degree: usize) -> f64 {
    let share = if strength > 0.0 { weight / strength } else { 0.0 };
    let exponent = i32::try_from(degree.saturating_sub(1)).unwrap_or(i32::MAX);
    (1.0 - share).max(0.0).powi(exponent)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Visit {
    distance: f64,
    node: NodeIndex,
}

impl Eq for Visit {}

impl Ord for Visit {
    // Reversed so BinaryHeap pops the nearest node first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Normalized edge betweenness with `disparity` as the edge length.
///
/// Weighted Brandes: one Dijkstra per source, then dependency accumulation
/// onto the predecessor edges. Values are divided by `n(n-1)` and indexed by
/// edge index.
pub fn edge_betweenness(graph: &SimilarityGraph, parallel: bool) -> Vec<f64> {
    let n = graph.node_count();
    let edge_count = graph.edge_count();

    let per_source: Vec<Vec<f64>> = if parallel {
        graph
            .node_indices()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|source| single_source_dependencies(graph, source))
            .collect()
    } else {
        graph
            .node_indices()
            .map(|source| single_source_dependencies(graph, source))
            .collect()
    };

    let mut centrality = vec![0.0; edge_count];
    for contributions in per_source {
        for (total, value) in centrality.iter_mut().zip(contributions) {
            *total += value;
        }
    }

    if n > 1 {
        let normalizer = (n * (n - 1)) as f64;
        for value in &mut centrality {
            *value /= normalizer;
        }
    }
    centrality
}

fn single_source_dependencies(graph: &SimilarityGraph, source: NodeIndex) -> Vec<f64> {
    let n = graph.node_count();
    let mut contributions = vec![0.0; graph.edge_count()];

    let mut distance: Vec<Option<f64>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut sigma = vec![0.0_f64; n];
    let mut predecessors: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); n];
    let mut stack = Vec::with_capacity(n);

    distance[source.index()] = Some(0.0);
    sigma[source.index()] = 1.0;
    let mut heap = BinaryHeap::new();
    heap.push(Visit {
        distance: 0.0,
        node: source,
    });

    while let Some(Visit { distance: d, node: v }) = heap.pop() {
        if settled[v.index()] {
            continue;
        }
        settled[v.index()] = true;
        stack.push(v);

        for edge in graph.edges_directed(v, Direction::Outgoing) {
            let w = edge.target();
            if settled[w.index()] {
                continue;
            }
            let candidate = d + edge.weight().disparity;

            match distance[w.index()] {
                Some(known) if (candidate - known).abs() <= DISTANCE_TOLERANCE => {
                    sigma[w.index()] += sigma[v.index()];
                    predecessors[w.index()].push((v, edge.id()));
                }
                Some(known) if candidate >= known => {}
                _ => {
                    distance[w.index()] = Some(candidate);
                    sigma[w.index()] = sigma[v.index()];
                    predecessors[w.index()] = vec![(v, edge.id())];
                    heap.push(Visit {
                        distance: candidate,
                        node: w,
                    });
                }
            }
        }
    }

    let mut delta = vec![0.0; n];
    while let Some(w) = stack.pop() {
        for &(v, edge) in &predecessors[w.index()] {
            if sigma[w.index()] > 0.0 {
                let share = sigma[v.index()] / sigma[w.index()] * (1.0 + delta[w.index()]);
                contributions[edge.index()] += share;
                delta[v.index()] += share;
            }
        }
    }
    contributions
}

/// Set `centrality` on every edge from [`edge_betweenness`]
pub fn assign_edge_betweenness(graph: &mut SimilarityGraph, parallel: bool) {
    let centrality = edge_betweenness(graph, parallel);
    for (edge, value) in graph.edge_weights_mut().zip(centrality) {
        edge.centrality = value;
    }
}

/// Run the disparity pass, then edge betweenness over disparity
pub fn apply_metrics(graph: &mut SimilarityGraph, parallel: bool) {
    assign_disparity(graph);
    assign_edge_betweenness(graph, parallel);
    debug!(
        "Computed edge metrics for {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SimilarityEdge;
    use crate::models::{CodeUnit, UnitKind};

    fn graph(n: usize, edges: &[(usize, usize, f64)]) -> SimilarityGraph {
        let mut graph = SimilarityGraph::new();
        let nodes: Vec<_> = (0..n)
            .map(|i| graph.add_node(CodeUnit::new(format!("n{i}"), format!("node{i}"), UnitKind::Function, "a.ts")))
            .collect();
        for &(s, t, w) in edges {
            graph.add_edge(nodes[s], nodes[t], SimilarityEdge::new(w));
        }
        graph
    }

    #[test]
    fn test_disparity_single_edge_is_one() {
        let mut g = graph(2, &[(0, 1, 0.5)]);
        assign_disparity(&mut g);
        assert!((g[EdgeIndex::new(0)].disparity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disparity_uses_weaker_side() {
        // node 0 has two outgoing edges: 0.6 and 0.4
        let mut g = graph(3, &[(0, 1, 0.6), (0, 2, 0.4)]);
        assign_disparity(&mut g);

        // out side: (1 - 0.6)^1 = 0.4, in side: degree 1 -> 1
        assert!((g[EdgeIndex::new(0)].disparity - 0.4).abs() < 1e-12);
        assert!((g[EdgeIndex::new(1)].disparity - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_edge_betweenness_on_path() {
        // 0 -> 1 -> 2: edge (0,1) carries pairs (0,1),(0,2); edge (1,2) carries (1,2),(0,2)
        let mut g = graph(3, &[(0, 1, 0.5), (1, 2, 0.5)]);
        assign_disparity(&mut g);
        let bc = edge_betweenness(&g, false);

        assert!((bc[0] - 2.0 / 6.0).abs() < 1e-12);
        assert!((bc[1] - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_betweenness_splits_equal_paths() {
        // two equal-length routes from 0 to 3
        let mut g = graph(4, &[(0, 1, 0.5), (0, 2, 0.5), (1, 3, 0.5), (2, 3, 0.5)]);
        assign_disparity(&mut g);
        let bc = edge_betweenness(&g, false);

        // edge (0,1): pair (0,1) plus half of (0,3)
        assert!((bc[0] - 1.5 / 12.0).abs() < 1e-12);
        assert!((bc[2] - 1.5 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut g = graph(5, &[(0, 1, 0.9), (1, 2, 0.4), (2, 3, 0.7), (3, 4, 0.5), (4, 0, 0.6), (1, 3, 0.35)]);
        assign_disparity(&mut g);
        assert_eq!(edge_betweenness(&g, false), edge_betweenness(&g, true));
    }

    #[test]
    fn test_apply_metrics_bounds() {
        let mut g = graph(4, &[(0, 1, 0.9), (1, 0, 0.9), (1, 2, 0.4), (2, 3, 0.9), (3, 2, 0.9)]);
        apply_metrics(&mut g, false);

        for edge in g.edge_weights() {
            assert!((0.0..=1.0).contains(&edge.disparity));
            assert!((0.0..=1.0).contains(&edge.centrality));
        }
        // the bridge carries more shortest paths than any local edge
        let bridge = g[EdgeIndex::new(2)].centrality;
        assert!(g.edge_weights().all(|e| e.centrality <= bridge));
    }

    #[test]
    fn test_empty_graph() {
        let mut g = SimilarityGraph::new();
        apply_metrics(&mut g, true);
        assert!(edge_betweenness(&g, false).is_empty());
    }
}
