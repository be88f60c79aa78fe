pub mod deletion_map;
pub mod loader;
pub mod merger;
pub mod open_segment;

pub use deletion_map::DeletionMap;
pub use loader::DeletionMapLoader;
pub use merger::{DeletionMapMerger, TargetAssignment};
pub use open_segment::{DeleteOutcome, OpenSegmentDeletions};

#[cfg(test)]
mod deletion_map_test;
#[cfg(test)]
mod merger_test;
