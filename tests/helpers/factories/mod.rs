pub mod index_fixture_factory;
pub mod segment_info_factory;
pub mod segment_merge_info_factory;
pub mod version_factory;

pub use index_fixture_factory::{IndexFixture, IndexFixtureFactory};
pub use segment_info_factory::SegmentInfoFactory;
pub use segment_merge_info_factory::SegmentMergeInfoFactory;
pub use version_factory::VersionFactory;

#[cfg(test)]
mod index_fixture_factory_test;
#[cfg(test)]
mod segment_info_factory_test;
#[cfg(test)]
mod segment_merge_info_factory_test;
#[cfg(test)]
mod version_factory_test;
