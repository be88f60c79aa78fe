use super::level_info::{LevelInfo, Topology};
use super::segment_id::SegmentId;
use crate::engine::errors::MergeError;

#[test]
fn sequence_topology_is_accepted() {
    assert!(LevelInfo::sequence().ensure_sequential().is_ok());
}

#[test]
fn hash_mod_topology_is_rejected() {
    let info = LevelInfo::hash_mod(4, 2);
    assert_eq!(info.levels.len(), 2);
    assert!(matches!(
        info.ensure_sequential(),
        Err(MergeError::UnsupportedTopology(_))
    ));
}

#[test]
fn add_and_remove_segments_track_levels() {
    let mut info = LevelInfo::sequence();
    info.add_segment(0, SegmentId::new(1));
    info.add_segment(0, SegmentId::new(2));
    info.add_segment(2, SegmentId::new(9));

    assert_eq!(info.levels.len(), 3);
    assert_eq!(info.levels[0].cursor, 2);
    assert_eq!(info.level_of(SegmentId::new(9)), Some(2));
    assert_eq!(info.segment_count(), 3);

    assert!(info.remove_segment(SegmentId::new(1)));
    assert!(!info.remove_segment(SegmentId::new(1)));
    assert_eq!(info.levels[0].segments, vec![SegmentId::new(2)]);
}

#[test]
fn topology_serializes_with_kind_tag() {
    let json = serde_json::to_value(Topology::HashMod { column_count: 4 }).unwrap();
    assert_eq!(json["kind"], "hash_mod");
    assert_eq!(json["column_count"], 4);
    let seq: Topology = serde_json::from_str(r#"{"kind":"sequence"}"#).unwrap();
    assert_eq!(seq, Topology::Sequence);
}
