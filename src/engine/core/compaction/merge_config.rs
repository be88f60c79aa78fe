use super::policy::MergeStrategyFactory;
use super::truncate::TruncateProfile;
use crate::engine::errors::{MergeError, MergeResult};
use serde::Deserialize;

/// `[merge]` section of the settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    pub strategy: String,
    #[serde(default)]
    pub strategy_param: String,
    #[serde(default)]
    pub optimize_param: String,
    /// Largest doc id the index may address after a merge.
    #[serde(default = "default_max_doc_id")]
    pub max_doc_id: u64,
    /// Encoders every plan is bound to.
    #[serde(default)]
    pub encoders: Vec<String>,
    #[serde(default)]
    pub truncate_profiles: Vec<TruncateProfile>,
}

fn default_max_doc_id() -> u64 {
    i32::MAX as u64
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            strategy: "balance_tree".to_string(),
            strategy_param: String::new(),
            optimize_param: String::new(),
            max_doc_id: default_max_doc_id(),
            encoders: Vec::new(),
            truncate_profiles: Vec::new(),
        }
    }
}

impl MergeConfig {
    pub fn for_strategy(strategy: &str, strategy_param: &str) -> Self {
        Self {
            strategy: strategy.to_string(),
            strategy_param: strategy_param.to_string(),
            ..Self::default()
        }
    }

    /// Doc ids are `u32` inside a merge, so the limit must fit one.
    pub fn check_max_doc_id(&self) -> MergeResult<()> {
        if self.max_doc_id == 0 || self.max_doc_id > u64::from(u32::MAX) {
            return Err(MergeError::Config(format!(
                "max_doc_id must be within 1..={}, got {}",
                u32::MAX,
                self.max_doc_id
            )));
        }
        Ok(())
    }

    /// Checks the doc id limit, the strategy and both parameter strings
    /// without keeping the strategy around.
    pub fn validate(&self) -> MergeResult<()> {
        self.check_max_doc_id()?;
        MergeStrategyFactory::create(&self.strategy, &self.strategy_param, &self.optimize_param)
            .map(|_| ())
    }
}
