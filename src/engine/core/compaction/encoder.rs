use super::merge_plan::MergePlan;
use crate::engine::core::segment::SegmentId;
use crate::engine::errors::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Per-plan state an encoder needs at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderResource {
    pub encoder: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// A pluggable column or index encoder participating in merges.
pub trait EncoderPlugin: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Binds the encoder to one plan and its allocated targets.
    fn bind(&self, plan: &MergePlan, targets: &[SegmentId]) -> MergeResult<EncoderResource>;
}

/// Binds with no extra state. Used for encoders whose output only depends on
/// the reclaim map.
#[derive(Debug, Clone)]
pub struct PassThroughEncoder {
    name: String,
}

impl PassThroughEncoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl EncoderPlugin for PassThroughEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&self, plan: &MergePlan, targets: &[SegmentId]) -> MergeResult<EncoderResource> {
        let mut params = BTreeMap::new();
        params.insert("sources".to_string(), plan.source_count().to_string());
        params.insert("targets".to_string(), targets.len().to_string());
        Ok(EncoderResource {
            encoder: self.name.clone(),
            params,
        })
    }
}

/// Encoders available to merges, passed explicitly to whoever binds plans.
#[derive(Debug, Clone, Default)]
pub struct EncoderRegistry {
    plugins: BTreeMap<String, Arc<dyn EncoderPlugin>>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn EncoderPlugin>) -> MergeResult<()> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(MergeError::Config(format!(
                "encoder '{}' registered twice",
                name
            )));
        }
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Registry holding a pass-through encoder for each name.
    pub fn with_pass_through<I, S>(names: I) -> MergeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(Arc::new(PassThroughEncoder::new(name)))?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> MergeResult<&Arc<dyn EncoderPlugin>> {
        self.plugins
            .get(name)
            .ok_or_else(|| MergeError::Config(format!("unknown encoder '{}'", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
