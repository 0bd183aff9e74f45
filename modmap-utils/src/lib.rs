//! modmap utilities
//!
//! Helpers shared by the module discovery engine:
//! - identifier splitting and string similarity
//! - configuration loading (TOML, JSON, YAML) and merging
//! - path normalization and text-file reading
//! - `tracing` subscriber setup

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod file;
pub mod logging;
pub mod string;

/// Re-export commonly used utilities
pub use config::{load_config, merge_configs, validate_config, ConfigBuilder, ConfigFormat, Validate};
pub use file::{normalize_path, normalize_path_str, read_text_file};
pub use logging::{basic_config, init_logging, LogLevel, LoggerConfig};
pub use string::{capitalize_word, jaro_winkler_similarity, split_identifier};

/// Result type used throughout modmap utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path operation error
    #[error("Path operation error: {0}")]
    PathOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}
