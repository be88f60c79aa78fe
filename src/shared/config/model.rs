use serde::Deserialize;
use std::env;

use crate::engine::core::compaction::{InMemorySchema, MergeConfig};

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub index: IndexConfig,
    pub merge: MergeConfig,
    #[serde(default)]
    pub gc: GcConfig,
    /// Fields truncate profiles may reference.
    #[serde(default)]
    pub schema: InMemorySchema,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GcConfig {
    #[serde(default = "default_keep_version_count")]
    pub keep_version_count: usize,
    #[serde(default)]
    pub reserved_versions: Vec<u32>,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            keep_version_count: default_keep_version_count(),
            reserved_versions: Vec::new(),
        }
    }
}

fn default_keep_version_count() -> usize {
    2
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("SEGMERGE_CONFIG").unwrap_or_else(|_| "config/segmerge".to_string());
    load_settings_from(&config_path)
}

pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(config_path))
        .build()?
        .try_deserialize()?;

    settings
        .merge
        .validate()
        .map_err(|e| config::ConfigError::Message(e.to_string()))?;
    Ok(settings)
}
