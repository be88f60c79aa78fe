pub mod balance_tree;
pub mod encoder;
pub mod executor;
pub mod merge_config;
pub mod merge_meta;
pub mod merge_meta_creator;
pub mod merge_plan;
pub mod optimize;
pub mod params;
pub mod policy;
pub mod realtime;
pub mod reclaim_map;
pub mod specific_segments;
pub mod truncate;

pub use balance_tree::{BalanceTreeMergeStrategy, BalanceTreeParams};
pub use encoder::{EncoderPlugin, EncoderRegistry, EncoderResource, PassThroughEncoder};
pub use executor::{IndexMerger, MergeExecutor, SegmentDirExecutor};
pub use merge_config::MergeConfig;
pub use merge_meta::{BoundMergePlan, MergeMeta};
pub use merge_meta_creator::{MergeMetaCreator, VersionSnapshot};
pub use merge_plan::{MergePlan, MergeTask, PlanReason, TargetTopology};
pub use optimize::{OptimizeMergeStrategy, OptimizeParams};
pub use policy::{MergeStrategy, MergeStrategyFactory};
pub use realtime::{RealtimeMergeStrategy, RealtimeParams};
pub use reclaim_map::{NewDocId, ReclaimMap, ReclaimSource};
pub use specific_segments::SpecificSegmentsMergeStrategy;
pub use truncate::{InMemorySchema, SchemaProvider, TruncateProfile};

#[cfg(test)]
mod merge_config_test;
#[cfg(test)]
mod merge_meta_creator_test;
#[cfg(test)]
mod params_test;
#[cfg(test)]
mod policy_test;
