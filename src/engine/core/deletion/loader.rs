use super::deletion_map::DeletionMap;
use crate::engine::core::file_store::FileStore;
use crate::engine::core::patch::{DanglingPatch, PatchFileFinder};
use crate::engine::core::segment::SegmentId;
use crate::engine::core::version::Version;
use crate::engine::errors::MergeResult;
use std::collections::BTreeMap;
use tracing::debug;

pub struct DeletionMapLoader;

impl DeletionMapLoader {
    /// Unions every deletion data file in `version` into one map per segment.
    /// Data for segments outside the version is dropped.
    pub fn load(
        store: &dyn FileStore,
        version: &Version,
    ) -> MergeResult<BTreeMap<SegmentId, DeletionMap>> {
        let files = PatchFileFinder::new(store, version).find_deletion_patches(DanglingPatch::Skip)?;
        let mut maps: BTreeMap<SegmentId, DeletionMap> = BTreeMap::new();
        for file in files {
            let loaded = DeletionMap::load(store, &file.path, file.dst_segment)?;
            maps.entry(file.dst_segment)
                .or_insert_with(|| DeletionMap::new(file.dst_segment))
                .union_with(&loaded);
        }
        debug!(
            target: "deletion_map_loader::load",
            version_id = version.version_id,
            segments_with_deletes = maps.len(),
            "Loaded deletion maps"
        );
        Ok(maps)
    }
}
