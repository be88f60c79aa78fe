use crate::engine::core::deletion::DeletionMap;
use crate::engine::core::segment::SegmentId;
use crate::engine::errors::MergeError;
use crate::test_helpers::factory::Factory;

#[test]
fn records_and_counts_deletes() {
    let mut map = DeletionMap::new(SegmentId::new(3));
    assert!(map.is_empty());
    assert!(map.delete(4));
    assert!(!map.delete(4));
    map.delete(20);

    assert!(map.is_deleted(4));
    assert!(!map.is_deleted(5));
    assert_eq!(map.deleted_count(), 2);
    assert_eq!(map.deleted_count_within(10), 1);
}

#[test]
fn union_merges_tombstones() {
    let mut a = DeletionMap::from_ids(SegmentId::new(1), [1, 2]);
    let b = DeletionMap::from_ids(SegmentId::new(1), [2, 7]);
    a.union_with(&b);
    assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 2, 7]);
}

#[test]
fn data_file_names() {
    assert_eq!(
        DeletionMap::data_path(SegmentId::new(4), SegmentId::new(2)),
        "segment_4/deletionmap/data_2"
    );
    assert_eq!(DeletionMap::parse_data_file_name("data_12"), Some(SegmentId::new(12)));
    assert_eq!(DeletionMap::parse_data_file_name("data_"), None);
    assert_eq!(DeletionMap::parse_data_file_name("data_1x"), None);
}

#[test]
fn stores_and_loads_through_file_store() {
    let fixture = Factory::index_fixture().with_segment(4, 10).create();
    let map = DeletionMap::from_ids(SegmentId::new(2), [0, 9, 65_536]);
    map.store(fixture.store(), SegmentId::new(4)).unwrap();

    let path = DeletionMap::data_path(SegmentId::new(4), SegmentId::new(2));
    let loaded = DeletionMap::load(fixture.store(), &path, SegmentId::new(2)).unwrap();
    assert_eq!(loaded, map);
}

#[test]
fn corrupt_data_is_reported() {
    let fixture = Factory::index_fixture().with_segment(4, 10).create();
    let path = DeletionMap::data_path(SegmentId::new(4), SegmentId::new(2));
    fixture.store().atomic_write(&path, b"garbage").unwrap();

    let err = DeletionMap::load(fixture.store(), &path, SegmentId::new(2)).unwrap_err();
    assert!(matches!(err, MergeError::Corruption(_)));

    let mut truncated = DeletionMap::from_ids(SegmentId::new(2), [1]).encode().unwrap();
    truncated.truncate(truncated.len() - 1);
    assert!(matches!(
        DeletionMap::decode(SegmentId::new(2), &truncated),
        Err(MergeError::Corruption(_))
    ));
}
