use super::version::{Version, VersionId};
use crate::engine::core::file_store::FileStore;
use crate::engine::errors::MergeResult;
use serde::{Deserialize, Serialize};

pub const DEPLOY_META_PREFIX: &str = "deploy_meta.";

/// Sidecar listing every path a version needs, for deployers that copy an
/// index version by version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployMeta {
    pub version_id: VersionId,
    pub files: Vec<String>,
}

impl DeployMeta {
    pub fn for_version(version: &Version) -> Self {
        let mut files: Vec<String> = version.segments.iter().map(|s| s.dir_name()).collect();
        files.push(Version::file_name(version.version_id));
        Self {
            version_id: version.version_id,
            files,
        }
    }

    pub fn file_name(version_id: VersionId) -> String {
        format!("{}{}", DEPLOY_META_PREFIX, version_id)
    }

    pub fn store(&self, store: &dyn FileStore) -> MergeResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        store.atomic_write(&Self::file_name(self.version_id), &bytes)?;
        Ok(())
    }

    pub fn load(store: &dyn FileStore, version_id: VersionId) -> MergeResult<Self> {
        let bytes = store.read(&Self::file_name(version_id))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
