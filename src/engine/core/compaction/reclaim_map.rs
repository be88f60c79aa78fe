use crate::engine::core::deletion::DeletionMap;
use crate::engine::core::segment::SegmentId;
use serde::{Deserialize, Serialize};

/// New address of a doc after the merge: target ordinal within the plan and
/// local doc id inside that target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocId {
    pub target: u32,
    pub local: u32,
}

/// One merge source as seen by the reclaim map builder.
pub struct ReclaimSource<'a> {
    pub segment_id: SegmentId,
    pub doc_count: u32,
    pub deletions: Option<&'a DeletionMap>,
}

/// Old `(segment, local id)` → new `(target, local id)` for one merge plan.
///
/// Entries are stored per source in dense arrays; `None` marks a reclaimed
/// (deleted) doc. Live docs keep their relative order and are spread over the
/// targets in contiguous runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclaimMap {
    sources: Vec<SegmentId>,
    /// Plan-wide new doc id per source doc.
    entries: Vec<Vec<Option<u32>>>,
    target_doc_counts: Vec<u32>,
    /// Source ordinal and local id of each plan-wide new doc id.
    reverse: Vec<(u32, u32)>,
}

impl ReclaimMap {
    /// Builds the map for `sources` merged into `target_count` targets.
    pub fn build(sources: &[ReclaimSource<'_>], target_count: usize) -> Self {
        let target_count = target_count.max(1);
        let mut entries = Vec::with_capacity(sources.len());
        let mut reverse = Vec::new();
        let mut next = 0u32;

        for (ordinal, source) in sources.iter().enumerate() {
            let mut per_source = Vec::with_capacity(source.doc_count as usize);
            for local in 0..source.doc_count {
                let deleted = source.deletions.is_some_and(|d| d.is_deleted(local));
                if deleted {
                    per_source.push(None);
                } else {
                    per_source.push(Some(next));
                    reverse.push((ordinal as u32, local));
                    next += 1;
                }
            }
            entries.push(per_source);
        }

        let live = next;
        let run = Self::run_length(live, target_count);
        let mut target_doc_counts = vec![0u32; target_count];
        for id in 0..live {
            target_doc_counts[(id / run) as usize] += 1;
        }

        Self {
            sources: sources.iter().map(|s| s.segment_id).collect(),
            entries,
            target_doc_counts,
            reverse,
        }
    }

    fn run_length(live: u32, target_count: usize) -> u32 {
        let targets = target_count as u32;
        live.div_ceil(targets).max(1)
    }

    fn run(&self) -> u32 {
        Self::run_length(self.reverse.len() as u32, self.target_doc_counts.len())
    }

    pub fn sources(&self) -> &[SegmentId] {
        &self.sources
    }

    pub fn target_count(&self) -> usize {
        self.target_doc_counts.len()
    }

    pub fn target_doc_counts(&self) -> &[u32] {
        &self.target_doc_counts
    }

    pub fn live_doc_count(&self) -> u32 {
        self.reverse.len() as u32
    }

    pub fn reclaimed_doc_count(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.iter().filter(|d| d.is_none()).count() as u32)
            .sum()
    }

    /// `None` when the doc was reclaimed or the address is unknown.
    pub fn map(&self, segment_id: SegmentId, local: u32) -> Option<NewDocId> {
        let ordinal = self.sources.iter().position(|s| *s == segment_id)?;
        let plan_id = (*self.entries[ordinal].get(local as usize)?)?;
        let run = self.run();
        Some(NewDocId {
            target: plan_id / run,
            local: plan_id % run,
        })
    }

    pub fn contains_source(&self, segment_id: SegmentId) -> bool {
        self.sources.contains(&segment_id)
    }

    /// Source address of a doc in the merged output.
    pub fn source_of(&self, doc: NewDocId) -> Option<(SegmentId, u32)> {
        let plan_id = doc.target.checked_mul(self.run())?.checked_add(doc.local)?;
        if doc.local >= self.run() {
            return None;
        }
        let (ordinal, local) = *self.reverse.get(plan_id as usize)?;
        Some((self.sources[ordinal as usize], local))
    }
}
