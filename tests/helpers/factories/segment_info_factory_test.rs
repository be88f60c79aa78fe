use crate::test_helpers::factory::Factory;
use serde_json::json;

#[test]
fn test_segment_info_factory() {
    let info = Factory::segment_info()
        .with("doc_count", 12)
        .with("merged", true)
        .with("truncate_profiles", json!(["by_price"]))
        .create();

    assert_eq!(info.doc_count, 12);
    assert!(info.merged);
    assert!(info.truncate_profiles.contains("by_price"));
}
