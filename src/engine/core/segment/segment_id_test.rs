use super::segment_id::{SEGMENT_DIR_PREFIX, SegmentId};

#[test]
fn dir_name_uses_prefix() {
    let s = SegmentId::new(42);
    assert_eq!(s.dir_name(), format!("{}42", SEGMENT_DIR_PREFIX));
    assert_eq!(s.to_string(), "42");
}

#[test]
fn from_dir_name_parses_valid_names() {
    assert_eq!(SegmentId::from_dir_name("segment_0"), Some(SegmentId::new(0)));
    assert_eq!(SegmentId::from_dir_name("segment_123"), Some(SegmentId::new(123)));
}

#[test]
fn from_dir_name_rejects_foreign_names() {
    assert_eq!(SegmentId::from_dir_name("segment_"), None);
    assert_eq!(SegmentId::from_dir_name("segment_1a"), None);
    assert_eq!(SegmentId::from_dir_name("segment_-1"), None);
    assert_eq!(SegmentId::from_dir_name("version.1"), None);
    assert_eq!(SegmentId::from_dir_name("00001"), None);
}

#[test]
fn ordering_follows_numeric_id() {
    let mut ids = vec![SegmentId::new(10), SegmentId::new(2), SegmentId::new(7)];
    ids.sort();
    assert_eq!(ids, vec![SegmentId::new(2), SegmentId::new(7), SegmentId::new(10)]);
}

#[test]
fn serializes_as_plain_number() {
    let json = serde_json::to_string(&vec![SegmentId::new(3), SegmentId::new(5)]).unwrap();
    assert_eq!(json, "[3,5]");
}
