use crate::test_helpers::factory::Factory;
use crate::test_helpers::factories::SegmentMergeInfoFactory;

#[test]
fn test_segment_merge_info_factory() {
    let info = Factory::segment_merge_info()
        .with("segment_id", 7)
        .with("doc_count", 50)
        .with("deleted_doc_count", 80)
        .create();

    assert_eq!(info.segment_id.get(), 7);
    assert_eq!(info.doc_count, 50);
    assert_eq!(info.deleted_doc_count, 50);
    assert_eq!(info.live_doc_count(), 0);
}

#[test]
fn test_create_many_assigns_running_base_ids() {
    let infos = SegmentMergeInfoFactory::create_many(&[10, 20, 5]);
    let bases: Vec<u64> = infos.iter().map(|i| i.base_doc_id).collect();
    assert_eq!(bases, vec![0, 10, 30]);
    assert_eq!(infos[2].segment_id.get(), 2);
}
