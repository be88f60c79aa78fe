use crate::engine::core::segment::{SegmentId, SegmentInfo};
use crate::engine::core::version::Version;
use crate::test_helpers::factory::Factory;

#[test]
fn test_index_fixture_factory() {
    let fixture = Factory::index_fixture()
        .with_segment(0, 10)
        .with_segment(1, 20)
        .with_deletions(1, 0, &[2, 3])
        .with_version(0, &[0, 1])
        .create();

    assert!(fixture.has_segment_dir(0));
    assert!(fixture.has_version(0));
    let info = SegmentInfo::load(fixture.store(), SegmentId::new(1)).unwrap();
    assert_eq!(info.doc_count, 20);
    let version = Version::load(fixture.store(), 0).unwrap();
    assert_eq!(version.segments.len(), 2);
    assert!(fixture.store().exists("segment_1/deletionmap/data_0"));
}
