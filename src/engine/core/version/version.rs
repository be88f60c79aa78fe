use crate::engine::core::file_store::FileStore;
use crate::engine::core::segment::{LevelInfo, SegmentId};
use crate::engine::errors::{MergeError, MergeResult, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub type VersionId = u32;

pub const VERSION_FILE_PREFIX: &str = "version.";

/// Committed point-in-time view of an index: an ordered segment set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub version_id: VersionId,
    pub segments: Vec<SegmentId>,
    pub timestamp: i64,
    #[serde(default)]
    pub level_info: LevelInfo,
}

impl Version {
    pub fn new(version_id: VersionId) -> Self {
        Self {
            version_id,
            segments: Vec::new(),
            timestamp: 0,
            level_info: LevelInfo::sequence(),
        }
    }

    /// Builds a sequential version from segment ids, in order.
    pub fn with_segments<I>(version_id: VersionId, segments: I) -> Self
    where
        I: IntoIterator<Item = SegmentId>,
    {
        let mut version = Self::new(version_id);
        for id in segments {
            version.add_segment(id);
        }
        version
    }

    /// Copy of this version under a new id, stamped with the current time.
    pub fn derive(&self, version_id: VersionId) -> Self {
        let mut next = self.clone();
        next.version_id = version_id;
        next.timestamp = chrono::Utc::now().timestamp_micros();
        next
    }

    pub fn add_segment(&mut self, segment_id: SegmentId) {
        self.add_segment_at_level(0, segment_id);
    }

    pub fn add_segment_at_level(&mut self, level_idx: u32, segment_id: SegmentId) {
        if self.has_segment(segment_id) {
            return;
        }
        self.segments.push(segment_id);
        self.segments.sort();
        self.level_info.add_segment(level_idx, segment_id);
    }

    pub fn remove_segment(&mut self, segment_id: SegmentId) -> bool {
        let before = self.segments.len();
        self.segments.retain(|s| *s != segment_id);
        self.level_info.remove_segment(segment_id);
        self.segments.len() != before
    }

    pub fn has_segment(&self, segment_id: SegmentId) -> bool {
        self.segments.binary_search(&segment_id).is_ok()
    }

    pub fn last_segment(&self) -> Option<SegmentId> {
        self.segments.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn file_name(version_id: VersionId) -> String {
        format!("{}{}", VERSION_FILE_PREFIX, version_id)
    }

    pub fn parse_file_name(name: &str) -> Option<VersionId> {
        let digits = name.strip_prefix(VERSION_FILE_PREFIX)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn to_json(&self) -> MergeResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn store(&self, store: &dyn FileStore) -> MergeResult<()> {
        store.atomic_write(&Self::file_name(self.version_id), &self.to_json()?)?;
        debug!(target: "version::store", version_id = self.version_id, segments = self.segments.len(), "Stored version file");
        Ok(())
    }

    pub fn load(store: &dyn FileStore, version_id: VersionId) -> MergeResult<Self> {
        let bytes = match store.read(&Self::file_name(version_id)) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => return Err(MergeError::VersionNotFound(version_id)),
            Err(e) => return Err(e.into()),
        };
        let mut version: Version = serde_json::from_slice(&bytes)?;
        if version.version_id != version_id {
            return Err(MergeError::Corruption(format!(
                "version file {} carries id {}",
                Self::file_name(version_id),
                version.version_id
            )));
        }
        if !version.segments.is_sorted() {
            debug!(target: "version::load", version_id, "Sorting unordered segment list");
            version.segments.sort();
        }
        version.segments.dedup();
        Ok(version)
    }
}
