//! Community detection
//!
//! [`Louvain`] partitions one weighted graph; [`HierarchyBuilder`] applies it
//! recursively and names the resulting modules.

pub mod hierarchy;
pub mod louvain;

pub use hierarchy::HierarchyBuilder;
pub use louvain::{modularity, Louvain, Partition};
