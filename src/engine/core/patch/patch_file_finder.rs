use super::patch_info::{DanglingPatch, PATCH_DIR, PATCH_FILE_SUFFIX, PatchFileInfo, PatchType};
use crate::engine::core::deletion::deletion_map::{DELETION_MAP_DIR, DeletionMap};
use crate::engine::core::file_store::{FileStore, file_store::join};
use crate::engine::core::segment::SegmentId;
use crate::engine::core::version::Version;
use crate::engine::errors::{MergeError, MergeResult};
use tracing::{debug, warn};

/// Finds patch files inside one shard's version.
pub struct PatchFileFinder<'a> {
    store: &'a dyn FileStore,
    version: &'a Version,
    shard_idx: usize,
}

impl<'a> PatchFileFinder<'a> {
    pub fn new(store: &'a dyn FileStore, version: &'a Version) -> Self {
        Self {
            store,
            version,
            shard_idx: 0,
        }
    }

    pub fn for_shard(store: &'a dyn FileStore, version: &'a Version, shard_idx: usize) -> Self {
        Self {
            store,
            version,
            shard_idx,
        }
    }

    pub fn patch_dir(segment: SegmentId, patch_type: PatchType, resource: &str) -> String {
        join(
            &join(&join(&segment.dir_name(), PATCH_DIR), patch_type.dir_name()),
            resource,
        )
    }

    pub fn patch_file_name(src: SegmentId, dst: SegmentId) -> String {
        format!("{}_{}{}", src.get(), dst.get(), PATCH_FILE_SUFFIX)
    }

    fn parse_patch_file_name(name: &str) -> Option<(SegmentId, SegmentId)> {
        let stem = name.strip_suffix(PATCH_FILE_SUFFIX)?;
        let (src, dst) = stem.split_once('_')?;
        let src = src.parse::<u32>().ok()?;
        let dst = dst.parse::<u32>().ok()?;
        Some((SegmentId::new(src), SegmentId::new(dst)))
    }

    /// Value patches for `(patch_type, resource)`, ordered by source segment
    /// then destination. A destination outside the version is corruption.
    pub fn find_patches(
        &self,
        patch_type: PatchType,
        resource: &str,
    ) -> MergeResult<Vec<PatchFileInfo>> {
        let mut found = Vec::new();
        for &holder in &self.version.segments {
            let dir = Self::patch_dir(holder, patch_type, resource);
            for name in self.store.list_dir(&dir)? {
                if !name.ends_with(PATCH_FILE_SUFFIX) {
                    continue;
                }
                let Some((src, dst)) = Self::parse_patch_file_name(&name) else {
                    return Err(MergeError::Corruption(format!(
                        "malformed patch file name {}/{}",
                        dir, name
                    )));
                };
                if src != holder {
                    return Err(MergeError::Corruption(format!(
                        "patch {}/{} names source segment {} but lives in segment {}",
                        dir, name, src, holder
                    )));
                }
                if !self.version.has_segment(dst) {
                    return Err(MergeError::Corruption(format!(
                        "patch {}/{} targets segment {} absent from version {} of shard {}",
                        dir, name, dst, self.version.version_id, self.shard_idx
                    )));
                }
                found.push(PatchFileInfo {
                    shard_idx: self.shard_idx,
                    src_segment: src,
                    dst_segment: dst,
                    path: join(&dir, &name),
                });
            }
        }
        found.sort_by_key(|p| (p.src_segment, p.dst_segment));
        debug!(
            target: "patch_file_finder::find_patches",
            shard = self.shard_idx,
            %patch_type,
            resource,
            count = found.len(),
            "Collected patch files"
        );
        Ok(found)
    }

    /// Deletion data files, keyed like patches: the holder segment is the
    /// source, the segment whose docs are deleted is the destination.
    pub fn find_deletion_patches(&self, dangling: DanglingPatch) -> MergeResult<Vec<PatchFileInfo>> {
        let mut found = Vec::new();
        for &holder in &self.version.segments {
            let dir = join(&holder.dir_name(), DELETION_MAP_DIR);
            for name in self.store.list_dir(&dir)? {
                let Some(dst) = DeletionMap::parse_data_file_name(&name) else {
                    continue;
                };
                if !self.version.has_segment(dst) {
                    match dangling {
                        DanglingPatch::Reject => {
                            return Err(MergeError::Corruption(format!(
                                "deletion data {}/{} targets segment {} absent from version {} of shard {}",
                                dir, name, dst, self.version.version_id, self.shard_idx
                            )));
                        }
                        DanglingPatch::Skip => {
                            debug!(target: "patch_file_finder::find_deletion_patches", %holder, %dst, "Skipping deletion data for segment outside version");
                            continue;
                        }
                    }
                }
                if dst > holder {
                    warn!(target: "patch_file_finder::find_deletion_patches", %holder, %dst, "Deletion data targets a newer segment");
                }
                found.push(PatchFileInfo {
                    shard_idx: self.shard_idx,
                    src_segment: holder,
                    dst_segment: dst,
                    path: join(&dir, &name),
                });
            }
        }
        found.sort_by_key(|p| (p.src_segment, p.dst_segment));
        Ok(found)
    }
}
