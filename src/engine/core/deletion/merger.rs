use super::deletion_map::DeletionMap;
use crate::engine::core::compaction::reclaim_map::ReclaimMap;
use crate::engine::core::segment::SegmentId;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Where the docs of a set of merged sources went.
pub struct TargetAssignment<'a> {
    pub reclaim_map: &'a ReclaimMap,
    /// Segment id of each target ordinal in the reclaim map.
    pub targets: &'a [SegmentId],
}

pub struct DeletionMapMerger;

impl DeletionMapMerger {
    /// Computes tombstones for the post-merge segment set.
    ///
    /// Segments not merged keep their tombstones unchanged; tombstones of merged
    /// sources are remapped through their reclaim map and unioned per target.
    /// Docs already reclaimed by the merge disappear. Tombstones of segments
    /// outside `active` are dropped.
    pub fn merge(
        existing: &BTreeMap<SegmentId, DeletionMap>,
        active: &BTreeSet<SegmentId>,
        assignments: &[TargetAssignment<'_>],
    ) -> BTreeMap<SegmentId, DeletionMap> {
        let mut merged: BTreeMap<SegmentId, DeletionMap> = BTreeMap::new();

        for (segment, map) in existing {
            if !active.contains(segment) {
                debug!(target: "deletion_map_merger::merge", segment_id = %segment, "Dropping tombstones of inactive segment");
                continue;
            }
            let assignment = assignments
                .iter()
                .find(|a| a.reclaim_map.contains_source(*segment));
            match assignment {
                None => {
                    if !map.is_empty() {
                        merged
                            .entry(*segment)
                            .or_insert_with(|| DeletionMap::new(*segment))
                            .union_with(map);
                    }
                }
                Some(assignment) => {
                    for local in map.iter() {
                        let Some(new_id) = assignment.reclaim_map.map(*segment, local) else {
                            continue;
                        };
                        let Some(&target) = assignment.targets.get(new_id.target as usize) else {
                            continue;
                        };
                        merged
                            .entry(target)
                            .or_insert_with(|| DeletionMap::new(target))
                            .delete(new_id.local);
                    }
                }
            }
        }
        merged
    }
}
