//! Hierarchical community detection
//!
//! Splits a similarity graph into communities, names each one and keeps
//! splitting every community with more than one member until Louvain finds
//! nothing further to separate. Work is processed one depth at a time from an
//! explicit frontier; branches at the same depth are independent and run on
//! the rayon pool. Every module lands in a [`ModuleForest`] arena.

use petgraph::graph::NodeIndex;
use rayon::prelude::*;
use tracing::{debug, info};

use super::louvain::Louvain;
use crate::graph::{apply_metrics, induced_subgraph, GraphStats, SimilarityGraph};
use crate::ids::module_id;
use crate::models::{CodeUnit, ModuleForest};
use crate::naming::infer_module_name;
use crate::DiscoveryConfig;

/// Pending split of one graph
struct Branch {
    graph: SimilarityGraph,
    depth: usize,
    parent: Option<usize>,
}

/// One community found while splitting a branch
struct Community {
    id: String,
    name: String,
    members: Vec<CodeUnit>,
    subgraph: SimilarityGraph,
}

/// Recursive module builder
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    louvain: Louvain,
    max_name_length: usize,
    fallback_name: String,
    parallel: bool,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

impl HierarchyBuilder {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            louvain: Louvain::new(config.resolution, config.max_louvain_passes),
            max_name_length: config.max_name_length,
            fallback_name: config.fallback_name.clone(),
            parallel: config.parallel_processing,
        }
    }

    /// Build the module forest for `graph`.
    ///
    /// A graph that Louvain cannot split at the top becomes a single
    /// level-1 module holding every unit.
    pub fn build(&self, graph: SimilarityGraph) -> ModuleForest {
        let mut forest = ModuleForest::new();
        if graph.node_count() == 0 {
            return forest;
        }

        let mut frontier = vec![Branch {
            graph,
            depth: 0,
            parent: None,
        }];

        while !frontier.is_empty() {
            let depth = frontier[0].depth;
            let splits: Vec<(Branch, Option<Vec<Community>>)> = if self.parallel {
                frontier
                    .into_par_iter()
                    .map(|mut branch| {
                        let split = self.split(&mut branch);
                        (branch, split)
                    })
                    .collect()
            } else {
                frontier
                    .into_iter()
                    .map(|mut branch| {
                        let split = self.split(&mut branch);
                        (branch, split)
                    })
                    .collect()
            };

            let mut next = Vec::new();
            let mut created = 0;
            for (branch, split) in splits {
                match split {
                    Some(communities) => {
                        for community in communities {
                            let splittable = community.members.len() > 1;
                            let index = forest.push(
                                community.id,
                                community.name,
                                branch.depth + 1,
                                community.members,
                                branch.parent,
                            );
                            created += 1;
                            if splittable {
                                next.push(Branch {
                                    graph: community.subgraph,
                                    depth: branch.depth + 1,
                                    parent: Some(index),
                                });
                            }
                        }
                    }
                    None if branch.parent.is_none() => {
                        let members: Vec<CodeUnit> = branch.graph.node_weights().cloned().collect();
                        let name = self.name_members(&members);
                        forest.push(module_id(0, &name), name, 1, members, None);
                        created += 1;
                    }
                    None => {}
                }
            }

            info!(
                "Hierarchy depth {depth}: {created} modules, {} branches to split",
                next.len()
            );
            frontier = next;
        }

        forest
    }

    /// Compute metrics and communities for one branch. `None` when the graph
    /// does not split into more than one community.
    fn split(&self, branch: &mut Branch) -> Option<Vec<Community>> {
        let stats = GraphStats::of(&branch.graph);
        apply_metrics(&mut branch.graph, self.parallel);

        let partition = self.louvain.detect_graph(&branch.graph);
        debug!(
            "Depth {}: {} nodes, {} edges, {} communities, modularity {:.4}",
            branch.depth,
            stats.node_count,
            stats.edge_count,
            partition.community_count(),
            partition.modularity
        );
        if partition.community_count() <= 1 {
            return None;
        }

        let communities = partition
            .communities
            .iter()
            .map(|nodes| {
                let indices: Vec<NodeIndex> = nodes.iter().map(|&n| NodeIndex::new(n)).collect();
                let members: Vec<CodeUnit> = indices.iter().map(|&i| branch.graph[i].clone()).collect();
                let name = self.name_members(&members);

                Community {
                    id: module_id(branch.depth, &name),
                    name,
                    subgraph: induced_subgraph(&branch.graph, &indices),
                    members,
                }
            })
            .collect();
        Some(communities)
    }

    /// Fresh corpus per community
    fn name_members(&self, members: &[CodeUnit]) -> String {
        infer_module_name(
            members.iter().map(|unit| unit.name.as_str()),
            self.max_name_length,
            &self.fallback_name,
        )
    }
}
