use crate::test_helpers::factory::Factory;
use serde_json::json;

#[test]
fn test_version_factory() {
    let version = Factory::version()
        .with("version_id", 4)
        .with("segments", json!([3, 1, 2]))
        .create();

    assert_eq!(version.version_id, 4);
    let ids: Vec<u32> = version.segments.iter().map(|s| s.get()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}
