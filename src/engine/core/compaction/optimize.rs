use super::merge_plan::{MergePlan, MergeTask, PlanReason};
use super::params::StrategyParams;
use super::policy::MergeStrategy;
use crate::engine::core::segment::{LevelInfo, SegmentMergeInfo};
use crate::engine::errors::MergeResult;
use tracing::{debug, info};

pub const OPTIMIZE_STRATEGY: &str = "optimize";

/// Parameters of the forced full merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeParams {
    /// Segments with more live docs than this are left out.
    pub max_doc_count: u32,
    /// Upper bound of live docs per output segment.
    pub after_merge_max_doc_count: u32,
    /// Caps the number of output segments; 0 means no cap.
    pub after_merge_max_segment_count: u32,
    /// Skip the merge when the only candidate is an already merged segment
    /// with nothing to reclaim.
    pub skip_single_merged_segment: bool,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        Self {
            max_doc_count: u32::MAX,
            after_merge_max_doc_count: u32::MAX,
            after_merge_max_segment_count: 0,
            skip_single_merged_segment: true,
        }
    }
}

impl OptimizeParams {
    pub fn parse(raw: &str) -> MergeResult<Self> {
        let defaults = Self::default();
        let mut params = StrategyParams::parse(OPTIMIZE_STRATEGY, raw)?;
        let parsed = Self {
            max_doc_count: params.take_u32("max-doc-count", defaults.max_doc_count)?,
            after_merge_max_doc_count: params
                .take_u32("after-merge-max-doc-count", defaults.after_merge_max_doc_count)?
                .max(1),
            after_merge_max_segment_count: params.take_u32(
                "after-merge-max-segment-count",
                defaults.after_merge_max_segment_count,
            )?,
            skip_single_merged_segment: params.take_bool(
                "skip-single-merged-segment",
                defaults.skip_single_merged_segment,
            )?,
        };
        params.finish()?;
        Ok(parsed)
    }
}

/// Merges every eligible segment into as few outputs as the parameters allow.
#[derive(Debug, Clone, Default)]
pub struct OptimizeMergeStrategy {
    params: OptimizeParams,
}

impl OptimizeMergeStrategy {
    pub fn new(params: OptimizeParams) -> Self {
        Self { params }
    }

    pub fn from_param(raw: &str) -> MergeResult<Self> {
        OptimizeParams::parse(raw).map(Self::new)
    }

    pub fn params(&self) -> &OptimizeParams {
        &self.params
    }

    /// Forced full merge shared by every strategy.
    pub fn optimize(&self, infos: &[SegmentMergeInfo]) -> MergeTask {
        let mut task = MergeTask::new();
        let candidates: Vec<&SegmentMergeInfo> = infos
            .iter()
            .filter(|s| s.live_doc_count() <= self.params.max_doc_count)
            .collect();

        if candidates.is_empty() {
            debug!(target: "optimize::plan", "No segment eligible for optimize");
            return task;
        }
        if candidates.len() == 1 && self.params.skip_single_merged_segment {
            let only = candidates[0];
            if only.merged && only.deleted_doc_count == 0 {
                debug!(target: "optimize::plan", segment_id = %only.segment_id, "Single merged segment without deletions, skipping");
                return task;
            }
        }

        let mut plan = MergePlan::from_infos(PlanReason::Optimize, candidates);
        let live = plan.projected_live_docs();
        let mut target_count = live
            .div_ceil(u64::from(self.params.after_merge_max_doc_count))
            .max(1);
        if self.params.after_merge_max_segment_count > 0 {
            target_count = target_count.min(u64::from(self.params.after_merge_max_segment_count));
        }
        plan.target_count = target_count as u32;

        info!(
            target: "optimize::plan",
            sources = plan.source_count(),
            live_docs = live,
            target_count = plan.target_count,
            "Planned optimize merge"
        );
        task.push(plan);
        task
    }
}

impl MergeStrategy for OptimizeMergeStrategy {
    fn name(&self) -> &'static str {
        OPTIMIZE_STRATEGY
    }

    fn create_merge_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        self.create_optimize_task(infos, level_info)
    }

    fn create_optimize_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        level_info.ensure_sequential()?;
        Ok(self.optimize(infos))
    }
}
