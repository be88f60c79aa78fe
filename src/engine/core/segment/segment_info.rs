use super::segment_id::SegmentId;
use crate::engine::core::file_store::{FileStore, file_store::join};
use crate::engine::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub const SEGMENT_INFO_FILE: &str = "segment_info";

/// Sealed metadata of one segment, stored as `segment_<id>/segment_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub doc_count: u32,
    #[serde(default)]
    pub byte_size: u64,
    /// Opaque position in the source stream this segment was built up to.
    #[serde(default)]
    pub locator: String,
    #[serde(default)]
    pub timestamp: i64,
    /// True when the segment was produced by a merge rather than a build.
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub level_idx: u32,
    #[serde(default)]
    pub column_idx: u32,
    /// Truncate profiles whose derived indexes are present in this segment.
    #[serde(default)]
    pub truncate_profiles: BTreeSet<String>,
}

impl SegmentInfo {
    pub fn new(doc_count: u32) -> Self {
        Self {
            doc_count,
            byte_size: 0,
            locator: String::new(),
            timestamp: 0,
            merged: false,
            level_idx: 0,
            column_idx: 0,
            truncate_profiles: BTreeSet::new(),
        }
    }

    pub fn path(segment_id: SegmentId) -> String {
        join(&segment_id.dir_name(), SEGMENT_INFO_FILE)
    }

    pub fn load(store: &dyn FileStore, segment_id: SegmentId) -> Result<Self, StoreError> {
        let bytes = store.read(&Self::path(segment_id))?;
        let info: SegmentInfo = serde_json::from_slice(&bytes)?;
        debug!(target: "segment_info::load", segment_id = %segment_id, doc_count = info.doc_count, "Loaded segment info");
        Ok(info)
    }

    pub fn store(&self, store: &dyn FileStore, segment_id: SegmentId) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        store.atomic_write(&Self::path(segment_id), &bytes)
    }
}
