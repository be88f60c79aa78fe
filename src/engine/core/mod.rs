pub mod compaction;
pub mod deletion;
pub mod file_store;
pub mod patch;
pub mod segment;
pub mod version;

pub use compaction::{IndexMerger, MergeConfig, MergeMeta, MergeMetaCreator, MergeStrategyFactory};
pub use deletion::DeletionMap;
pub use file_store::{FileStore, LocalFileStore};
pub use patch::MultiPartPatchFinder;
pub use segment::{SegmentId, SegmentInfo, SegmentMergeInfo};
pub use version::{Version, VersionCommitter};
