//! Configuration management for voxfuse tools.
//!
//! Configuration is stored in ~/.voxfuse/{app_name}/config.yaml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use voxfuse_audio::QualityConfig;
use voxfuse_enroll::{Dtype, FuseOptions, ModelCacheConfig, ModelCatalog, WeightConfig};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".voxfuse";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Tool configuration.
///
/// Every section falls back to its defaults when absent from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name (not serialized).
    #[serde(skip)]
    pub app_name: String,

    /// Sample weighting parameters.
    pub weighting: WeightConfig,

    /// Embedding fusion parameters.
    pub fusion: FuseOptions,

    /// Audio quality estimation parameters.
    pub quality: QualityConfig,

    /// Model checkpoints and residency.
    pub models: ModelsConfig,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

/// The `models` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Model name to checkpoint location.
    pub checkpoints: ModelCatalog,

    /// Maximum number of models resident at once.
    pub max_models_in_memory: usize,

    /// Tensor types tried in order when loading a checkpoint.
    pub preferred_dtypes: Vec<Dtype>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let cache = ModelCacheConfig::default();
        Self {
            checkpoints: ModelCatalog::default(),
            max_models_in_memory: cache.capacity,
            preferred_dtypes: cache.preferred_dtypes,
        }
    }
}

impl ModelsConfig {
    /// Returns the residency settings for a model cache.
    pub fn cache_config(&self) -> ModelCacheConfig {
        ModelCacheConfig {
            capacity: self.max_models_in_memory,
            preferred_dtypes: self.preferred_dtypes.clone(),
        }
    }
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir(app_name: &str) -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR).join(app_name))
    }

    /// Gets the default config file path.
    pub fn default_config_path(app_name: &str) -> Option<PathBuf> {
        Self::default_config_dir(app_name).map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the config directory path.
    pub fn dir(&self) -> Option<&Path> {
        self.config_path.parent()
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Gets a value by dotted key, e.g. `fusion.outlier_threshold`.
    pub fn get(&self, key: &str) -> anyhow::Result<Value> {
        let mut node = serde_yaml::to_value(self)?;
        for part in split_key(key)? {
            node = match node {
                Value::Mapping(mut m) => m
                    .remove(part)
                    .ok_or_else(|| anyhow::anyhow!("unknown config key '{}'", key))?,
                _ => anyhow::bail!("unknown config key '{}'", key),
            };
        }
        Ok(node)
    }

    /// Sets a value by dotted key and saves the configuration.
    ///
    /// `value` is parsed as YAML, so `0.8`, `f32` and `[f16, f32]` all work.
    /// The result must still deserialize into a valid configuration.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let parts = split_key(key)?;
        let parsed: Value = serde_yaml::from_str(value)?;

        let mut root = serde_yaml::to_value(&*self)?;
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| anyhow::anyhow!("empty config key"))?;

        let mut node = &mut root;
        for part in parents {
            node = node
                .get_mut(*part)
                .ok_or_else(|| anyhow::anyhow!("unknown config key '{}'", key))?;
        }
        let map = node
            .as_mapping_mut()
            .ok_or_else(|| anyhow::anyhow!("unknown config key '{}'", key))?;
        // Checkpoints are the only section that accepts new keys.
        if !map.contains_key(*last) && parents != ["models", "checkpoints"] {
            anyhow::bail!("unknown config key '{}'", key);
        }
        map.insert(Value::from(*last), parsed);

        let updated: Config = serde_yaml::from_value(root)
            .map_err(|e| anyhow::anyhow!("invalid value for '{}': {}", key, e))?;
        self.weighting = updated.weighting;
        self.fusion = updated.fusion;
        self.quality = updated.quality;
        self.models = updated.models;
        self.save()
    }
}

fn split_key(key: &str) -> anyhow::Result<Vec<&str>> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("invalid config key '{}'", key);
    }
    Ok(parts)
}

fn resolve_path(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<PathBuf> {
    match custom_path {
        Some(p) => Ok(PathBuf::from(p)),
        None => Config::default_config_path(app_name)
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path")),
    }
}

/// Loads configuration for the specified app, creating a default file if
/// none exists.
pub fn load_config(app_name: &str, custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = resolve_path(app_name, custom_path)?;

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cfg = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)?
        }
    } else {
        let cfg = Config::default();
        let content = serde_yaml::to_string(&cfg)?;
        std::fs::write(&config_path, content)?;
        cfg
    };

    cfg.app_name = app_name.to_string();
    cfg.config_path = config_path;

    Ok(cfg)
}

/// Saves configuration to the specified path.
pub fn save_config(
    app_name: &str,
    config: &Config,
    custom_path: Option<&str>,
) -> anyhow::Result<()> {
    let config_path = resolve_path(app_name, custom_path)?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_yaml::to_string(config)?;
    std::fs::write(&config_path, content)?;
    Ok(())
}
