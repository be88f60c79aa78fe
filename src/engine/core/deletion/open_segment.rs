use super::deletion_map::DeletionMap;
use crate::engine::core::segment::SegmentId;
use parking_lot::RwLock;
use roaring::RoaringBitmap;
use std::collections::BTreeSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Applied,
    AlreadyDeleted,
    /// The doc id is not visible yet; the delete applies once it is published.
    Deferred,
}

#[derive(Debug, Default)]
struct OpenDeletionState {
    visible_docs: u32,
    deleted: RoaringBitmap,
    deferred: BTreeSet<u32>,
}

/// Tombstones of the segment still being built.
///
/// Doc ids become visible through `publish_docs`. A delete against an id that
/// is not yet visible is parked and applied on publication, so a delete never
/// lands on an id whose document is half-assigned.
#[derive(Debug)]
pub struct OpenSegmentDeletions {
    segment_id: SegmentId,
    state: RwLock<OpenDeletionState>,
}

impl OpenSegmentDeletions {
    pub fn new(segment_id: SegmentId) -> Self {
        Self {
            segment_id,
            state: RwLock::new(OpenDeletionState::default()),
        }
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    pub fn visible_docs(&self) -> u32 {
        self.state.read().visible_docs
    }

    pub fn delete(&self, local_doc_id: u32) -> DeleteOutcome {
        let mut state = self.state.write();
        if local_doc_id >= state.visible_docs {
            state.deferred.insert(local_doc_id);
            debug!(target: "open_segment_deletions::delete", segment_id = %self.segment_id, local_doc_id, "Deferred delete of unpublished doc");
            return DeleteOutcome::Deferred;
        }
        if state.deleted.insert(local_doc_id) {
            DeleteOutcome::Applied
        } else {
            DeleteOutcome::AlreadyDeleted
        }
    }

    /// Marks docs `[0, visible_docs)` as assigned and applies parked deletes in
    /// that range. Returns how many parked deletes were applied.
    pub fn publish_docs(&self, visible_docs: u32) -> usize {
        let mut state = self.state.write();
        if visible_docs <= state.visible_docs {
            return 0;
        }
        state.visible_docs = visible_docs;
        let ready: Vec<u32> = state.deferred.range(..visible_docs).copied().collect();
        for id in &ready {
            state.deferred.remove(id);
            state.deleted.insert(*id);
        }
        ready.len()
    }

    pub fn is_deleted(&self, local_doc_id: u32) -> bool {
        self.state.read().deleted.contains(local_doc_id)
    }

    pub fn deleted_count(&self) -> u32 {
        self.state.read().deleted.len() as u32
    }

    pub fn deferred_count(&self) -> usize {
        self.state.read().deferred.len()
    }

    /// Freezes the tombstones into a sealed map. Parked deletes that never
    /// became visible refer to docs that were never written and are dropped.
    pub fn seal(&self) -> DeletionMap {
        let state = self.state.read();
        if !state.deferred.is_empty() {
            warn!(
                target: "open_segment_deletions::seal",
                segment_id = %self.segment_id,
                dropped = state.deferred.len(),
                "Dropping deletes for docs never published"
            );
        }
        DeletionMap::from_ids(self.segment_id, state.deleted.iter())
    }
}
