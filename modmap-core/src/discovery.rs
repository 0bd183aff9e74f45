//! Module discovery pipeline
//!
//! file records -> validated units -> similarity graph -> module forest

use std::path::Path;

use modmap_utils::validate_config;
use tracing::info;

use crate::community::HierarchyBuilder;
use crate::graph::{GraphBuilder, SimilarityGraph};
use crate::input::{flatten_records, load_file_records, validate_records};
use crate::models::{CodeUnit, FileRecord, ModuleForest};
use crate::{DiscoveryConfig, Error, Result};

/// Entry point of the engine. One call to [`ModuleDiscovery::discover`] owns
/// its graph and corpora end to end; nothing is kept between runs.
#[derive(Debug, Clone)]
pub struct ModuleDiscovery {
    config: DiscoveryConfig,
}

impl ModuleDiscovery {
    /// Create a discovery engine, rejecting invalid configuration
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: DiscoveryConfig::default(),
        }
    }

    pub const fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Validate extractor records and discover their modules
    pub fn discover(&self, records: &[FileRecord]) -> Result<ModuleForest> {
        validate_records(records)?;
        self.discover_units(flatten_records(records))
    }

    /// Load extractor records from a JSON file and discover their modules
    pub fn discover_file(&self, path: &Path) -> Result<ModuleForest> {
        let records = load_file_records(path)?;
        self.discover(&records)
    }

    /// Discover modules in an already validated unit list
    pub fn discover_units(&self, units: Vec<CodeUnit>) -> Result<ModuleForest> {
        if units.is_empty() {
            info!("No code units to analyze");
            return Ok(ModuleForest::new());
        }

        info!("Discovering modules in {} code units", units.len());
        let forest = self.run(|| {
            let graph = self.build_graph(&units);
            HierarchyBuilder::from_config(&self.config).build(graph)
        })?;

        info!(
            "Discovered {} modules ({} top-level, depth {})",
            forest.len(),
            forest.roots().count(),
            forest.max_level()
        );
        Ok(forest)
    }

    /// Similarity graph for `units` under this configuration
    pub fn build_graph(&self, units: &[CodeUnit]) -> SimilarityGraph {
        GraphBuilder::from_config(&self.config).build(units)
    }

    /// Run `job` on a dedicated rayon pool sized by `max_workers`
    fn run<T, F>(&self, job: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        if !self.config.parallel_processing {
            return Ok(job());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build worker pool: {e}")))?;
        Ok(pool.install(job))
    }
}

impl Default for ModuleDiscovery {
    fn default() -> Self {
        Self::with_defaults()
    }
}
