use super::encoder::EncoderResource;
use super::merge_plan::{MergePlan, MergeTask};
use super::reclaim_map::ReclaimMap;
use crate::engine::core::file_store::FileStore;
use crate::engine::core::segment::{SegmentId, SegmentInfo};
use crate::engine::core::version::{Version, VersionId};
use crate::engine::errors::{MergeError, MergeResult, StoreError};
use serde::{Deserialize, Serialize};

pub const MERGE_META_PREFIX: &str = "merge_meta.";

/// A plan with everything its execution needs resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundMergePlan {
    pub plan: MergePlan,
    pub target_segments: Vec<SegmentId>,
    /// Directory of each target, relative to the index root.
    pub target_dirs: Vec<String>,
    pub target_infos: Vec<SegmentInfo>,
    pub reclaim_map: ReclaimMap,
    #[serde(default)]
    pub encoders: Vec<EncoderResource>,
}

impl BoundMergePlan {
    pub fn targets(&self) -> impl Iterator<Item = (SegmentId, &SegmentInfo)> {
        self.target_segments.iter().copied().zip(self.target_infos.iter())
    }
}

/// Output of one planning pass over `base_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeMeta {
    pub base_version: Version,
    pub target_version_id: VersionId,
    pub task: MergeTask,
    pub plans: Vec<BoundMergePlan>,
}

impl MergeMeta {
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn file_name(base_version_id: VersionId) -> String {
        format!("{}{}", MERGE_META_PREFIX, base_version_id)
    }

    /// Every target segment across plans.
    pub fn target_segments(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .plans
            .iter()
            .flat_map(|p| p.target_segments.iter().copied())
            .collect();
        ids.sort();
        ids
    }

    pub fn store(&self, store: &dyn FileStore) -> MergeResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        store.atomic_write(&Self::file_name(self.base_version.version_id), &bytes)?;
        Ok(())
    }

    pub fn load(store: &dyn FileStore, base_version_id: VersionId) -> MergeResult<Self> {
        let bytes = match store.read(&Self::file_name(base_version_id)) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(path)) => {
                return Err(MergeError::Corruption(format!("merge meta {} missing", path)));
            }
            Err(e) => return Err(e.into()),
        };
        let meta: MergeMeta = serde_json::from_slice(&bytes)?;
        if meta.base_version.version_id != base_version_id {
            return Err(MergeError::Corruption(format!(
                "merge meta for version {} describes version {}",
                base_version_id, meta.base_version.version_id
            )));
        }
        Ok(meta)
    }
}
