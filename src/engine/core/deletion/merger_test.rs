use crate::engine::core::compaction::reclaim_map::{ReclaimMap, ReclaimSource};
use crate::engine::core::deletion::{DeletionMap, DeletionMapMerger, TargetAssignment};
use crate::engine::core::segment::SegmentId;
use std::collections::{BTreeMap, BTreeSet};

fn seg(id: u32) -> SegmentId {
    SegmentId::new(id)
}

#[test]
fn remaps_merged_sources_and_keeps_others() {
    // Deletes known at planning time.
    let planned0 = DeletionMap::from_ids(seg(0), [1]);
    let reclaim = ReclaimMap::build(
        &[
            ReclaimSource {
                segment_id: seg(0),
                doc_count: 4,
                deletions: Some(&planned0),
            },
            ReclaimSource {
                segment_id: seg(1),
                doc_count: 4,
                deletions: None,
            },
        ],
        1,
    );
    let targets = [seg(5)];

    // Current tombstones: doc 2 of segment 1 deleted after planning.
    let mut existing = BTreeMap::new();
    existing.insert(seg(0), DeletionMap::from_ids(seg(0), [1]));
    existing.insert(seg(1), DeletionMap::from_ids(seg(1), [2]));
    existing.insert(seg(2), DeletionMap::from_ids(seg(2), [0, 3]));
    existing.insert(seg(9), DeletionMap::from_ids(seg(9), [0]));

    let active: BTreeSet<SegmentId> = [0, 1, 2].map(seg).into_iter().collect();
    let merged = DeletionMapMerger::merge(
        &existing,
        &active,
        &[TargetAssignment {
            reclaim_map: &reclaim,
            targets: &targets,
        }],
    );

    assert_eq!(merged.keys().copied().collect::<Vec<_>>(), vec![seg(2), seg(5)]);
    assert_eq!(merged[&seg(2)].iter().collect::<Vec<_>>(), vec![0, 3]);
    // Segment 0 has 3 live docs, so doc 2 of segment 1 becomes doc 5.
    assert_eq!(merged[&seg(5)].iter().collect::<Vec<_>>(), vec![5]);
}

#[test]
fn nothing_merged_carries_everything_over() {
    let mut existing = BTreeMap::new();
    existing.insert(seg(0), DeletionMap::from_ids(seg(0), [4]));
    existing.insert(seg(1), DeletionMap::new(seg(1)));
    let active: BTreeSet<SegmentId> = [0, 1].map(seg).into_iter().collect();

    let merged = DeletionMapMerger::merge(&existing, &active, &[]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[&seg(0)], existing[&seg(0)]);
}
