use super::segment_id::SegmentId;
use super::segment_info::SegmentInfo;
use serde::{Deserialize, Serialize};

/// Planning descriptor of one segment. Metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMergeInfo {
    pub segment_id: SegmentId,
    pub doc_count: u32,
    pub deleted_doc_count: u32,
    pub byte_size: u64,
    pub level_idx: u32,
    pub column_idx: u32,
    /// Global doc id of this segment's first doc within the version.
    pub base_doc_id: u64,
    pub merged: bool,
}

impl SegmentMergeInfo {
    pub fn new(segment_id: SegmentId, doc_count: u32, deleted_doc_count: u32) -> Self {
        Self {
            segment_id,
            doc_count,
            deleted_doc_count: deleted_doc_count.min(doc_count),
            byte_size: 0,
            level_idx: 0,
            column_idx: 0,
            base_doc_id: 0,
            merged: false,
        }
    }

    pub fn from_segment_info(
        segment_id: SegmentId,
        info: &SegmentInfo,
        deleted_doc_count: u32,
        base_doc_id: u64,
    ) -> Self {
        Self {
            segment_id,
            doc_count: info.doc_count,
            deleted_doc_count: deleted_doc_count.min(info.doc_count),
            byte_size: info.byte_size,
            level_idx: info.level_idx,
            column_idx: info.column_idx,
            base_doc_id,
            merged: info.merged,
        }
    }

    #[inline]
    pub fn live_doc_count(&self) -> u32 {
        self.doc_count - self.deleted_doc_count
    }

    /// True when more than `percent` percent of the docs are deleted.
    #[inline]
    pub fn deletion_exceeds(&self, percent: u32) -> bool {
        self.doc_count > 0
            && u64::from(self.deleted_doc_count) * 100 > u64::from(percent) * u64::from(self.doc_count)
    }

    /// Deleted fraction in basis points, used for ordering.
    #[inline]
    pub fn deletion_bps(&self) -> u32 {
        if self.doc_count == 0 {
            return 0;
        }
        (u64::from(self.deleted_doc_count) * 10_000 / u64::from(self.doc_count)) as u32
    }
}
