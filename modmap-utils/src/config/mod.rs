//! Configuration utilities
//!
//! Configuration structs are read from TOML, JSON or YAML (chosen by file
//! extension), layered over their defaults and validated before use.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::file::read_text_file;
use crate::UtilError;

/// Semantic validation hook for configuration structs
pub trait Validate {
    /// Check field ranges and invariants, returning `UtilError::Config` on failure
    fn validate(&self) -> crate::Result<()>;
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yml" | "yaml" => Ok(Self::Yaml),
            other => Err(UtilError::Config(format!(
                "Unsupported config format {other:?} for {}",
                path.display()
            ))),
        }
    }

    /// Deserialize `content` written in this format
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> crate::Result<T> {
        let parsed = match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| UtilError::Config(format!("{self:?} parse error: {e}")))
    }
}

/// Deep-merge `overlay` into `base`: objects merge key by key, anything else replaces
fn overlay_value(base: &mut Value, overlay: Value) {
    if let (Value::Object(base_map), Value::Object(overlay_map)) = (&mut *base, &overlay) {
        for (key, value) in overlay_map {
            match base_map.get_mut(key) {
                Some(slot) => overlay_value(slot, value.clone()),
                None => {
                    base_map.insert(key.clone(), value.clone());
                }
            }
        }
        return;
    }
    *base = overlay;
}

fn to_value<T: Serialize>(config: &T, role: &str) -> crate::Result<Value> {
    serde_json::to_value(config)
        .map_err(|e| UtilError::Serialization(format!("Cannot serialize {role} config: {e}")))
}

/// Load a configuration file (format detected from the extension)
pub fn load_config<T: DeserializeOwned>(path: &Path) -> crate::Result<T> {
    let format = ConfigFormat::from_path(path)?;
    format.parse(&read_text_file(path)?)
}

/// Layer `overlay` over `base` in place
pub fn merge_configs<T>(base: &mut T, overlay: T) -> crate::Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = to_value(&*base, "base")?;
    overlay_value(&mut merged, to_value(&overlay, "overlay")?);

    *base = serde_json::from_value(merged)
        .map_err(|e| UtilError::Serialization(format!("Cannot rebuild merged config: {e}")))?;
    Ok(())
}

/// Validate a configuration: it must serialize cleanly and pass its own checks
pub fn validate_config<T>(config: &T) -> crate::Result<()>
where
    T: Serialize + Validate,
{
    to_value(config, "validated")?;
    config.validate()
}

/// Fluent builder: defaults, then files and overrides in order, then validation
#[derive(Debug)]
pub struct ConfigBuilder<T> {
    config: T,
}

impl<T> ConfigBuilder<T>
where
    T: Default + Serialize + Validate + DeserializeOwned,
{
    /// Start from `T::default()`
    pub fn new() -> Self {
        Self {
            config: T::default(),
        }
    }

    /// Layer a config file over the current values.
    ///
    /// Files are deserialized in full, so `T` should use `#[serde(default)]`
    /// for partial files to keep unspecified defaults.
    pub fn load_file(mut self, path: &Path) -> crate::Result<Self> {
        let file_config: T = load_config(path)?;
        merge_configs(&mut self.config, file_config)?;
        Ok(self)
    }

    /// Layer another config over the current values
    pub fn merge(mut self, other: T) -> crate::Result<Self> {
        merge_configs(&mut self.config, other)?;
        Ok(self)
    }

    /// Validate and return the final config
    pub fn build(self) -> crate::Result<T> {
        validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl<T> Default for ConfigBuilder<T>
where
    T: Default + Serialize + Validate + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}
