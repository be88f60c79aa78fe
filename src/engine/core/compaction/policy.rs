use super::balance_tree::{BALANCE_TREE_STRATEGY, BalanceTreeMergeStrategy};
use super::merge_plan::MergeTask;
use super::optimize::{OPTIMIZE_STRATEGY, OptimizeMergeStrategy};
use super::realtime::{REALTIME_STRATEGY, RealtimeMergeStrategy};
use super::specific_segments::{SPECIFIC_SEGMENTS_STRATEGY, SpecificSegmentsMergeStrategy};
use crate::engine::core::segment::{LevelInfo, SegmentMergeInfo};
use crate::engine::errors::{MergeError, MergeResult};
use std::fmt::Debug;
use tracing::info;

/// Plans merges over the segments of one version.
///
/// Implementations are pure: the same infos and level info always produce the
/// same task, and plans within a task never share a source segment. Only the
/// sequential topology is supported.
pub trait MergeStrategy: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Regular merge pass.
    fn create_merge_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask>;

    /// Forced full merge.
    fn create_optimize_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask>;
}

pub struct MergeStrategyFactory;

impl MergeStrategyFactory {
    pub const NAMES: [&'static str; 4] = [
        BALANCE_TREE_STRATEGY,
        REALTIME_STRATEGY,
        SPECIFIC_SEGMENTS_STRATEGY,
        OPTIMIZE_STRATEGY,
    ];

    /// Builds the strategy registered under `name`, validating both parameter
    /// strings up front.
    pub fn create(
        name: &str,
        strategy_param: &str,
        optimize_param: &str,
    ) -> MergeResult<Box<dyn MergeStrategy>> {
        let optimize = OptimizeMergeStrategy::from_param(optimize_param)?;
        let strategy: Box<dyn MergeStrategy> = match name {
            BALANCE_TREE_STRATEGY => Box::new(BalanceTreeMergeStrategy::from_param(
                strategy_param,
                optimize,
            )?),
            REALTIME_STRATEGY => Box::new(RealtimeMergeStrategy::from_param(
                strategy_param,
                optimize,
            )?),
            SPECIFIC_SEGMENTS_STRATEGY => Box::new(SpecificSegmentsMergeStrategy::from_param(
                strategy_param,
                optimize,
            )?),
            OPTIMIZE_STRATEGY => {
                if !strategy_param.trim().is_empty() {
                    return Err(MergeError::Config(format!(
                        "optimize: strategy_param must be empty, got '{}'",
                        strategy_param
                    )));
                }
                Box::new(optimize)
            }
            other => {
                return Err(MergeError::Config(format!(
                    "unknown merge strategy '{}', expected one of {}",
                    other,
                    Self::NAMES.join(", ")
                )));
            }
        };
        info!(target: "merge_strategy_factory::create", strategy = name, %strategy_param, %optimize_param, "Created merge strategy");
        Ok(strategy)
    }
}
