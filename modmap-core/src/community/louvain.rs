//! Louvain modularity optimization on a weighted digraph
//!
//! Two-phase algorithm:
//! 1. Local moving: visit nodes in index order and move each one to the
//!    neighboring community with the best directed-modularity gain
//! 2. Aggregation: collapse communities into super-nodes (internal weight
//!    becomes a self-loop) and repeat
//!
//! Directed modularity with resolution `γ` and total weight `m`:
//! `Q = Σ_c [ in_c / m - γ · out_c · in_c' / m² ]`, where `in_c` is the
//! weight inside `c`, `out_c` the weight leaving its nodes and `in_c'` the
//! weight entering them.

use std::collections::{BTreeMap, HashMap};

use petgraph::visit::EdgeRef;

use crate::graph::SimilarityGraph;

/// Gains smaller than this do not move a node
const GAIN_TOLERANCE: f64 = 1e-12;

/// Result of community detection
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// node index -> community id. Ids are numbered by first appearance in node order.
    pub assignments: Vec<usize>,
    /// community id -> node indices in ascending order
    pub communities: Vec<Vec<usize>>,
    /// Directed modularity of the final partition
    pub modularity: f64,
}

impl Partition {
    pub fn community_count(&self) -> usize {
        self.communities.len()
    }

    fn from_assignments(raw: &[usize]) -> Self {
        let mut renumber: HashMap<usize, usize> = HashMap::new();
        let mut communities: Vec<Vec<usize>> = Vec::new();
        let assignments = raw
            .iter()
            .enumerate()
            .map(|(node, &community)| {
                let id = *renumber.entry(community).or_insert_with(|| {
                    communities.push(Vec::new());
                    communities.len() - 1
                });
                communities[id].push(node);
                id
            })
            .collect();

        Self {
            assignments,
            communities,
            modularity: 0.0,
        }
    }
}

/// Louvain solver settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Louvain {
    resolution: f64,
    max_passes: usize,
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new(1.0, 100)
    }
}

/// Working graph for one aggregation level
struct Level {
    out_adj: Vec<BTreeMap<usize, f64>>,
    in_adj: Vec<BTreeMap<usize, f64>>,
    k_out: Vec<f64>,
    k_in: Vec<f64>,
}

impl Level {
    fn new(n: usize, edges: &BTreeMap<(usize, usize), f64>) -> Self {
        let mut level = Self {
            out_adj: vec![BTreeMap::new(); n],
            in_adj: vec![BTreeMap::new(); n],
            k_out: vec![0.0; n],
            k_in: vec![0.0; n],
        };
        for (&(s, t), &w) in edges {
            level.k_out[s] += w;
            level.k_in[t] += w;
            if s != t {
                *level.out_adj[s].entry(t).or_insert(0.0) += w;
                *level.in_adj[t].entry(s).or_insert(0.0) += w;
            }
        }
        level
    }
}

impl Louvain {
    pub const fn new(resolution: f64, max_passes: usize) -> Self {
        Self {
            resolution,
            max_passes,
        }
    }

    /// Detect communities using each edge's blended community weight
    pub fn detect_graph(&self, graph: &SimilarityGraph) -> Partition {
        let edges: Vec<(usize, usize, f64)> = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight().community_weight()))
            .collect();
        self.detect(graph.node_count(), &edges)
    }

    /// Detect communities in a digraph with `n` nodes and weighted edges.
    ///
    /// An edgeless (or zero-weight) graph yields one community per node.
    pub fn detect(&self, n: usize, edges: &[(usize, usize, f64)]) -> Partition {
        let mut current: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(s, t, w) in edges {
            if s < n && t < n && w > 0.0 {
                *current.entry((s, t)).or_insert(0.0) += w;
            }
        }
        let m: f64 = current.values().sum();
        if n == 0 || m <= 0.0 {
            return Partition::from_assignments(&(0..n).collect::<Vec<_>>());
        }

        // original node -> node of the current level
        let mut membership: Vec<usize> = (0..n).collect();
        let mut level_size = n;

        loop {
            let level = Level::new(level_size, &current);
            let (community, moved) = self.local_moving(&level, m);
            if !moved {
                break;
            }

            let mut renumber: HashMap<usize, usize> = HashMap::new();
            for &c in &community {
                let next = renumber.len();
                renumber.entry(c).or_insert(next);
            }
            for node in &mut membership {
                *node = renumber[&community[*node]];
            }

            let mut aggregated: BTreeMap<(usize, usize), f64> = BTreeMap::new();
            for (&(s, t), &w) in &current {
                let key = (renumber[&community[s]], renumber[&community[t]]);
                *aggregated.entry(key).or_insert(0.0) += w;
            }
            current = aggregated;
            level_size = renumber.len();

            if level_size == 1 {
                break;
            }
        }

        let mut partition = Partition::from_assignments(&membership);
        partition.modularity = modularity(&partition.assignments, edges, self.resolution);
        partition
    }

    /// One local-moving phase. Returns the community of every level node and
    /// whether any node moved.
    fn local_moving(&self, level: &Level, m: f64) -> (Vec<usize>, bool) {
        let n = level.k_out.len();
        let mut community: Vec<usize> = (0..n).collect();
        let mut tot_out = level.k_out.clone();
        let mut tot_in = level.k_in.clone();
        let mut moved_any = false;

        for _ in 0..self.max_passes {
            let mut moved = false;

            for i in 0..n {
                let current = community[i];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (&j, &w) in level.out_adj[i].iter().chain(level.in_adj[i].iter()) {
                    *links.entry(community[j]).or_insert(0.0) += w;
                }

                tot_out[current] -= level.k_out[i];
                tot_in[current] -= level.k_in[i];

                let gain = |c: usize| {
                    links.get(&c).copied().unwrap_or(0.0) / m
                        - self.resolution
                            * (level.k_out[i] * tot_in[c] + level.k_in[i] * tot_out[c])
                            / (m * m)
                };

                let mut best = current;
                let mut best_gain = gain(current);
                for &candidate in links.keys() {
                    let candidate_gain = gain(candidate);
                    if candidate_gain > best_gain + GAIN_TOLERANCE {
                        best = candidate;
                        best_gain = candidate_gain;
                    }
                }

                community[i] = best;
                tot_out[best] += level.k_out[i];
                tot_in[best] += level.k_in[i];
                if best != current {
                    moved = true;
                    moved_any = true;
                }
            }

            if !moved {
                break;
            }
        }

        (community, moved_any)
    }
}

/// Directed modularity of `assignments` over weighted `edges`
pub fn modularity(assignments: &[usize], edges: &[(usize, usize, f64)], resolution: f64) -> f64 {
    let n = assignments.len();
    let m: f64 = edges
        .iter()
        .filter(|(s, t, _)| *s < n && *t < n)
        .map(|(_, _, w)| w)
        .sum();
    if m <= 0.0 {
        return 0.0;
    }

    let count = assignments.iter().max().map_or(0, |max| max + 1);
    let mut internal = vec![0.0; count];
    let mut out_total = vec![0.0; count];
    let mut in_total = vec![0.0; count];

    for &(s, t, w) in edges {
        if s >= n || t >= n {
            continue;
        }
        let (cs, ct) = (assignments[s], assignments[t]);
        out_total[cs] += w;
        in_total[ct] += w;
        if cs == ct {
            internal[cs] += w;
        }
    }

    (0..count)
        .map(|c| internal[c] / m - resolution * out_total[c] * in_total[c] / (m * m))
        .sum()
}
