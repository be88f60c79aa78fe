use super::merge_plan::{MergePlan, MergeTask, PlanReason};
use super::optimize::OptimizeMergeStrategy;
use super::policy::MergeStrategy;
use crate::engine::core::segment::{LevelInfo, SegmentId, SegmentMergeInfo};
use crate::engine::errors::{MergeError, MergeResult};
use tracing::{debug, info};

pub const SPECIFIC_SEGMENTS_STRATEGY: &str = "specific_segments";
const MERGE_SEGMENTS_KEY: &str = "merge_segments";

/// Merges operator-chosen groups: `merge_segments=1,2;3,4`.
#[derive(Debug, Clone)]
pub struct SpecificSegmentsMergeStrategy {
    groups: Vec<Vec<SegmentId>>,
    optimize: OptimizeMergeStrategy,
}

impl SpecificSegmentsMergeStrategy {
    pub fn new(groups: Vec<Vec<SegmentId>>, optimize: OptimizeMergeStrategy) -> Self {
        Self { groups, optimize }
    }

    pub fn from_param(raw: &str, optimize: OptimizeMergeStrategy) -> MergeResult<Self> {
        Self::parse_groups(raw).map(|g| Self::new(g, optimize))
    }

    pub fn groups(&self) -> &[Vec<SegmentId>] {
        &self.groups
    }

    fn parse_groups(raw: &str) -> MergeResult<Vec<Vec<SegmentId>>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let Some(list) = raw
            .strip_prefix(MERGE_SEGMENTS_KEY)
            .and_then(|rest| rest.trim_start().strip_prefix('='))
        else {
            return Err(MergeError::Config(format!(
                "specific_segments: expected '{}=<ids>[;<ids>...]', got '{}'",
                MERGE_SEGMENTS_KEY, raw
            )));
        };

        let mut groups = Vec::new();
        for group in list.split(';') {
            let mut ids = Vec::new();
            for id in group.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let id = id.parse::<u32>().map_err(|_| {
                    MergeError::Config(format!("specific_segments: invalid segment id '{}'", id))
                })?;
                ids.push(SegmentId::new(id));
            }
            groups.push(ids);
        }
        Ok(groups)
    }

    fn plan(&self, infos: &[SegmentMergeInfo]) -> MergeTask {
        let mut task = MergeTask::new();
        for (idx, group) in self.groups.iter().enumerate() {
            let mut plan = MergePlan::new(PlanReason::Explicit);
            for id in group {
                if task.contains_segment(*id) {
                    debug!(target: "specific_segments::plan", group = idx, segment_id = %id, "Segment already taken by an earlier group");
                    continue;
                }
                match infos.iter().find(|s| s.segment_id == *id) {
                    Some(info) => plan.add_segment(info.clone()),
                    None => {
                        debug!(target: "specific_segments::plan", group = idx, segment_id = %id, "Segment not in version, skipping");
                    }
                }
            }
            task.push(plan);
        }
        task
    }
}

impl MergeStrategy for SpecificSegmentsMergeStrategy {
    fn name(&self) -> &'static str {
        SPECIFIC_SEGMENTS_STRATEGY
    }

    fn create_merge_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        level_info.ensure_sequential()?;
        let task = self.plan(infos);
        info!(target: "specific_segments::create_merge_task", groups = self.groups.len(), plans = task.len(), "Planned explicit merge");
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
