use super::merge_plan::{MergePlan, MergeTask, PlanReason};
use super::optimize::OptimizeMergeStrategy;
use super::params::{MB, StrategyParams};
use super::policy::MergeStrategy;
use crate::engine::core::segment::{LevelInfo, SegmentMergeInfo};
use crate::engine::errors::{MergeError, MergeResult};
use tracing::{debug, info};

pub const REALTIME_STRATEGY: &str = "realtime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeParams {
    pub max_small_segment_count: u32,
    /// Accumulated small-segment bytes that trigger a merge.
    pub merge_size_upperbound: u64,
    /// Segments at or above this many bytes are large.
    pub merge_size_lowerbound: u64,
}

impl Default for RealtimeParams {
    fn default() -> Self {
        Self {
            max_small_segment_count: 10,
            merge_size_upperbound: 128 * MB,
            merge_size_lowerbound: 32 * MB,
        }
    }
}

impl RealtimeParams {
    pub fn parse(raw: &str) -> MergeResult<Self> {
        let defaults = Self::default();
        let mut params = StrategyParams::parse(REALTIME_STRATEGY, raw)?;
        let parsed = Self {
            max_small_segment_count: params
                .take_u32("max-small-segment-count", defaults.max_small_segment_count)?,
            merge_size_upperbound: params
                .take_u64("merge-size-upperbound", defaults.merge_size_upperbound / MB)?
                .saturating_mul(MB),
            merge_size_lowerbound: params
                .take_u64("merge-size-lowerbound", defaults.merge_size_lowerbound / MB)?
                .saturating_mul(MB),
        };
        params.finish()?;
        if parsed.merge_size_upperbound < parsed.merge_size_lowerbound {
            return Err(MergeError::Config(format!(
                "realtime: merge-size-upperbound ({} MB) is below merge-size-lowerbound ({} MB)",
                parsed.merge_size_upperbound / MB,
                parsed.merge_size_lowerbound / MB
            )));
        }
        Ok(parsed)
    }
}

/// Keeps the tail of freshly built small segments short.
///
/// Walks from the newest segment backwards collecting small segments. The
/// collected suffix merges once its bytes reach the upper bound, or once a
/// large segment ends the walk while the suffix holds at most the allowed
/// number of small segments. A suffix needs two segments to trigger. When
/// nothing triggers, everything merges if the segment count exceeds that
/// number.
#[derive(Debug, Clone)]
pub struct RealtimeMergeStrategy {
    params: RealtimeParams,
    optimize: OptimizeMergeStrategy,
}

impl RealtimeMergeStrategy {
    pub fn new(params: RealtimeParams, optimize: OptimizeMergeStrategy) -> Self {
        Self { params, optimize }
    }

    pub fn from_param(raw: &str, optimize: OptimizeMergeStrategy) -> MergeResult<Self> {
        RealtimeParams::parse(raw).map(|p| Self::new(p, optimize))
    }

    pub fn params(&self) -> &RealtimeParams {
        &self.params
    }

    fn plan(&self, infos: &[SegmentMergeInfo]) -> MergeTask {
        let max_small = self.params.max_small_segment_count as usize;
        let mut suffix: Vec<&SegmentMergeInfo> = Vec::new();
        let mut accumulated = 0u64;
        let mut chosen: Option<Vec<&SegmentMergeInfo>> = None;

        for info in infos.iter().rev() {
            if info.byte_size >= self.params.merge_size_lowerbound {
                if suffix.len() <= max_small {
                    debug!(target: "realtime::plan", segment_id = %info.segment_id, small = suffix.len(), "Large segment reached, merging small suffix");
                    chosen = Some(std::mem::take(&mut suffix));
                }
                break;
            }
            suffix.push(info);
            accumulated = accumulated.saturating_add(info.byte_size);
            if accumulated >= self.params.merge_size_upperbound {
                debug!(target: "realtime::plan", bytes = accumulated, small = suffix.len(), "Small segments reached upper bound");
                chosen = Some(std::mem::take(&mut suffix));
                break;
            }
        }

        let mut chosen = chosen.filter(|s| s.len() >= 2);
        if chosen.is_none() && infos.len() > max_small {
            debug!(target: "realtime::plan", segments = infos.len(), "Segment count above limit, merging everything");
            chosen = Some(infos.iter().collect());
        }

        let mut task = MergeTask::new();
        if let Some(segments) = chosen.filter(|s| s.len() >= 2) {
            task.push(MergePlan::from_infos(PlanReason::SizeThreshold, segments));
        }
        task
    }
}

impl MergeStrategy for RealtimeMergeStrategy {
    fn name(&self) -> &'static str {
        REALTIME_STRATEGY
    }

    fn create_merge_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        level_info.ensure_sequential()?;
        let task = self.plan(infos);
        info!(target: "realtime::create_merge_task", segments = infos.len(), plans = task.len(), "Planned realtime merge");
        Ok(task)
    }

    fn create_optimize_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        level_info.ensure_sequential()?;
        Ok(self.optimize.optimize(infos))
    }
}
