use crate::engine::core::segment::{SegmentId, SegmentInfo};
use crate::engine::errors::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A truncated (top-k by sort field) view that merged segments must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateProfile {
    pub name: String,
    /// Attribute the truncated view is sorted by.
    pub sort_field: String,
    /// Index the view is derived from, if any.
    #[serde(default)]
    pub source_index: Option<String>,
}

impl TruncateProfile {
    pub fn new(name: impl Into<String>, sort_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_field: sort_field.into(),
            source_index: None,
        }
    }

    pub fn with_source_index(mut self, index: impl Into<String>) -> Self {
        self.source_index = Some(index.into());
        self
    }
}

/// Field lookup used to resolve truncate profiles.
pub trait SchemaProvider: Send + Sync {
    fn has_attribute(&self, name: &str) -> bool;
    fn has_index(&self, name: &str) -> bool;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySchema {
    #[serde(default)]
    pub attributes: BTreeSet<String>,
    #[serde(default)]
    pub indexes: BTreeSet<String>,
}

impl InMemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into());
        self
    }

    pub fn with_index(mut self, name: impl Into<String>) -> Self {
        self.indexes.insert(name.into());
        self
    }
}

impl SchemaProvider for InMemorySchema {
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    fn has_index(&self, name: &str) -> bool {
        self.indexes.contains(name)
    }
}

/// Every profile must reference fields the schema knows.
pub fn validate_profiles(
    profiles: &[TruncateProfile],
    schema: &dyn SchemaProvider,
) -> MergeResult<()> {
    let mut names = BTreeSet::new();
    for profile in profiles {
        if !names.insert(profile.name.as_str()) {
            return Err(MergeError::Config(format!(
                "duplicate truncate profile '{}'",
                profile.name
            )));
        }
        if !schema.has_attribute(&profile.sort_field) {
            return Err(MergeError::UnresolvedTruncateProfile {
                profile: profile.name.clone(),
                field: profile.sort_field.clone(),
            });
        }
        if let Some(index) = &profile.source_index {
            if !schema.has_index(index) {
                return Err(MergeError::UnresolvedTruncateProfile {
                    profile: profile.name.clone(),
                    field: index.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Segments missing at least one configured profile and so needing a rebuild.
pub fn pending_truncate_segments(
    profiles: &[TruncateProfile],
    infos: &BTreeMap<SegmentId, SegmentInfo>,
) -> BTreeSet<SegmentId> {
    if profiles.is_empty() {
        return BTreeSet::new();
    }
    infos
        .iter()
        .filter(|(_, info)| {
            profiles
                .iter()
                .any(|p| !info.truncate_profiles.contains(&p.name))
        })
        .map(|(id, _)| *id)
        .collect()
}
