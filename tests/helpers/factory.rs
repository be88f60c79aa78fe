pub use super::factories::{
    IndexFixtureFactory, SegmentInfoFactory, SegmentMergeInfoFactory, VersionFactory,
};

pub struct Factory;

impl Factory {
    pub fn segment_merge_info() -> SegmentMergeInfoFactory {
        SegmentMergeInfoFactory::new()
    }

    pub fn segment_info() -> SegmentInfoFactory {
        SegmentInfoFactory::new()
    }

    pub fn version() -> VersionFactory {
        VersionFactory::new()
    }

    pub fn index_fixture() -> IndexFixtureFactory {
        IndexFixtureFactory::new()
    }
}
