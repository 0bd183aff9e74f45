//! modmap core - module discovery engine
//!
//! Groups code units into a hierarchy of named modules using only naming,
//! file-path proximity and static dependencies:
//! - TF-IDF term corpus and automatic module naming
//! - pairwise similarity scoring and weighted graph construction
//! - disparity and edge-betweenness graph metrics
//! - recursive Louvain community detection

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::multiple_crate_versions,  // Common in large dependency trees
    clippy::module_name_repetitions,  // Often necessary for clarity
    clippy::cast_precision_loss,      // Graph sizes stay far below 2^52
)]

pub mod community;
pub mod discovery;
pub mod graph;
pub mod ids;
pub mod input;
pub mod models;
pub mod naming;
pub mod similarity;

// Re-export commonly used types for convenience
pub use discovery::ModuleDiscovery;
pub use graph::{GraphBuilder, GraphStats, SimilarityEdge, SimilarityGraph};
pub use models::{CodeUnit, FileRecord, ModuleEntry, ModuleForest, ModuleNode, UnitDependency, UnitKind};
pub use naming::TermCorpus;
pub use similarity::SimilarityScorer;

use modmap_utils::{UtilError, Validate};

/// Result type used throughout modmap core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for modmap core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extractor output violates the input contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Utility error
    #[error("Utility error: {0}")]
    Util(#[from] UtilError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tuning knobs for one discovery run
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Minimum combined weight for an edge
    pub edge_threshold: f64,
    /// Louvain resolution; higher values give smaller communities
    pub resolution: f64,
    /// Character budget for generated module names
    pub max_name_length: usize,
    /// Name used when a community yields no usable terms
    pub fallback_name: String,
    /// Enable parallel processing
    pub parallel_processing: bool,
    /// Number of worker threads
    pub max_workers: usize,
    /// Cap on local-moving passes per Louvain level
    pub max_louvain_passes: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 0.33,
            resolution: 1.0,
            max_name_length: 20,
            fallback_name: "Unknown".to_string(),
            parallel_processing: true,
            max_workers: std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4),
            max_louvain_passes: 100,
        }
    }
}

impl Validate for DiscoveryConfig {
    fn validate(&self) -> modmap_utils::Result<()> {
        if !(0.0..=1.0).contains(&self.edge_threshold) {
            return Err(UtilError::Config(format!(
                "edge_threshold must be within [0, 1], got {}",
                self.edge_threshold
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(UtilError::Config(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if self.max_name_length == 0 {
            return Err(UtilError::Config("max_name_length must be at least 1".to_string()));
        }
        if self.fallback_name.trim().is_empty() {
            return Err(UtilError::Config("fallback_name must not be empty".to_string()));
        }
        if self.max_workers == 0 {
            return Err(UtilError::Config("max_workers must be at least 1".to_string()));
        }
        if self.max_louvain_passes == 0 {
            return Err(UtilError::Config("max_louvain_passes must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl DiscoveryConfig {
    /// Load a config file (TOML, JSON or YAML) over the defaults and validate it
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        Ok(modmap_utils::ConfigBuilder::<Self>::new().load_file(path)?.build()?)
    }
}
