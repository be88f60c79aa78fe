use super::patch_file_finder::PatchFileFinder;
use super::patch_info::{
    DanglingPatch, DeletePatchInfos, PatchFileInfo, PatchInfos, PatchType, VirtualPatch,
};
use super::virtual_segment::VirtualSegmentTable;
use crate::engine::core::file_store::FileStore;
use crate::engine::core::segment::SegmentId;
use crate::engine::core::version::Version;
use crate::engine::errors::{MergeError, MergeResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// One independently built shard: its store and the version being unified.
#[derive(Clone)]
pub struct ShardDirectory {
    pub store: Arc<dyn FileStore>,
    pub version: Version,
}

/// Reconciles patches of several shards into the unified virtual id space.
pub struct MultiPartPatchFinder {
    shards: Vec<ShardDirectory>,
    table: VirtualSegmentTable,
}

impl MultiPartPatchFinder {
    pub fn new(shards: Vec<ShardDirectory>) -> Self {
        let table = VirtualSegmentTable::build(shards.iter().map(|s| &s.version));
        Self { shards, table }
    }

    pub fn table(&self) -> &VirtualSegmentTable {
        &self.table
    }

    /// Value patches grouped by destination virtual id, in shard then source order.
    pub fn find_patches(&self, patch_type: PatchType, resource: &str) -> MergeResult<PatchInfos> {
        let mut grouped = BTreeMap::new();
        for (shard_idx, shard) in self.shards.iter().enumerate() {
            let finder = PatchFileFinder::for_shard(shard.store.as_ref(), &shard.version, shard_idx);
            let files = finder.find_patches(patch_type, resource)?;
            self.add_files(&mut grouped, files)?;
        }
        info!(
            target: "multi_part_patch_finder::find_patches",
            %patch_type,
            resource,
            shards = self.shards.len(),
            destinations = grouped.len(),
            "Unified patch files across shards"
        );
        Ok(grouped)
    }

    /// Deletion data grouped the same way. Data for a segment outside its
    /// shard's version is corruption here, as for value patches.
    pub fn find_deletion_patches(&self) -> MergeResult<DeletePatchInfos> {
        let mut grouped = BTreeMap::new();
        for (shard_idx, shard) in self.shards.iter().enumerate() {
            let finder = PatchFileFinder::for_shard(shard.store.as_ref(), &shard.version, shard_idx);
            let files = finder.find_deletion_patches(DanglingPatch::Reject)?;
            self.add_files(&mut grouped, files)?;
        }
        Ok(grouped)
    }

    fn add_files(
        &self,
        grouped: &mut BTreeMap<u32, Vec<VirtualPatch>>,
        files: Vec<PatchFileInfo>,
    ) -> MergeResult<()> {
        for file in files {
            let src_virtual = self.virtual_of(file.shard_idx, &file, file.src_segment)?;
            let dst_virtual = self.virtual_of(file.shard_idx, &file, file.dst_segment)?;
            grouped.entry(dst_virtual).or_default().push(VirtualPatch {
                src_virtual,
                dst_virtual,
                file,
            });
        }
        Ok(())
    }

    fn virtual_of(
        &self,
        shard_idx: usize,
        file: &PatchFileInfo,
        local: SegmentId,
    ) -> MergeResult<u32> {
        self.table.to_virtual(shard_idx, local).ok_or_else(|| {
            MergeError::Corruption(format!(
                "{} in shard {} references segment {} absent from its version",
                file.path, shard_idx, local
            ))
        })
    }
}
