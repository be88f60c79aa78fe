use crate::engine::core::segment::{SegmentId, SegmentMergeInfo};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Level coordinates the merged output is placed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetTopology {
    pub level_idx: u32,
    pub column_idx: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanReason {
    Tiered,
    DeletionReclaim,
    SizeThreshold,
    Explicit,
    Optimize,
    TruncateRebuild,
}

/// One compaction unit: source segments merged into `target_count` outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePlan {
    /// Sources in ascending id order.
    pub sources: Vec<SegmentMergeInfo>,
    pub target: TargetTopology,
    pub target_count: u32,
    pub reason: PlanReason,
}

impl MergePlan {
    pub fn new(reason: PlanReason) -> Self {
        Self {
            sources: Vec::new(),
            target: TargetTopology::default(),
            target_count: 1,
            reason,
        }
    }

    pub fn from_infos<'a, I>(reason: PlanReason, infos: I) -> Self
    where
        I: IntoIterator<Item = &'a SegmentMergeInfo>,
    {
        let mut plan = Self::new(reason);
        for info in infos {
            plan.add_segment(info.clone());
        }
        plan
    }

    pub fn add_segment(&mut self, info: SegmentMergeInfo) {
        match self
            .sources
            .binary_search_by_key(&info.segment_id, |s| s.segment_id)
        {
            Ok(_) => {}
            Err(pos) => self.sources.insert(pos, info),
        }
    }

    pub fn source_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.sources.iter().map(|s| s.segment_id)
    }

    pub fn contains(&self, segment_id: SegmentId) -> bool {
        self.sources
            .binary_search_by_key(&segment_id, |s| s.segment_id)
            .is_ok()
    }

    pub fn first_source(&self) -> Option<SegmentId> {
        self.sources.first().map(|s| s.segment_id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Live docs the plan will write.
    pub fn projected_live_docs(&self) -> u64 {
        self.sources
            .iter()
            .map(|s| u64::from(s.live_doc_count()))
            .sum()
    }

    pub fn total_byte_size(&self) -> u64 {
        self.sources.iter().map(|s| s.byte_size).sum()
    }
}

/// Ordered, pairwise source-disjoint merge plans from one planning pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeTask {
    plans: Vec<MergePlan>,
}

impl MergeTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `plan` unless it is empty or shares a source with an existing
    /// plan. Returns whether it was added.
    pub fn push(&mut self, plan: MergePlan) -> bool {
        if plan.sources.is_empty() {
            return false;
        }
        if let Some(overlap) = plan.source_ids().find(|id| self.contains_segment(*id)) {
            warn!(target: "merge_task::push", segment_id = %overlap, reason = ?plan.reason, "Rejecting plan overlapping an earlier plan");
            return false;
        }
        self.plans.push(plan);
        true
    }

    pub fn contains_segment(&self, segment_id: SegmentId) -> bool {
        self.plans.iter().any(|p| p.contains(segment_id))
    }

    pub fn plans(&self) -> &[MergePlan] {
        &self.plans
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Every segment id consumed by the task.
    pub fn merged_segments(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self.plans.iter().flat_map(|p| p.source_ids()).collect();
        ids.sort();
        ids
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
