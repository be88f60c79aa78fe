pub mod level_info;
pub mod segment_id;
pub mod segment_id_allocator;
pub mod segment_info;
pub mod segment_merge_info;

pub use level_info::{LevelInfo, LevelMeta, Topology};
pub use segment_id::SegmentId;
pub use segment_id_allocator::SegmentIdAllocator;
pub use segment_info::SegmentInfo;
pub use segment_merge_info::SegmentMergeInfo;

#[cfg(test)]
mod level_info_test;
#[cfg(test)]
mod segment_id_test;
