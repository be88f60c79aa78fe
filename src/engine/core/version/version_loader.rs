use super::version::{Version, VersionId};
use crate::engine::core::file_store::FileStore;
use crate::engine::errors::MergeResult;
use tracing::{debug, warn};

pub struct VersionLoader;

impl VersionLoader {
    /// Ids of every version file in the store root, ascending.
    pub fn list_versions(store: &dyn FileStore) -> MergeResult<Vec<VersionId>> {
        let mut ids: Vec<VersionId> = store
            .list_dir("")?
            .iter()
            .filter_map(|name| Version::parse_file_name(name))
            .collect();
        ids.sort_unstable();
        debug!(target: "version_loader::list_versions", count = ids.len(), "Listed version files");
        Ok(ids)
    }

    pub fn load(store: &dyn FileStore, version_id: VersionId) -> MergeResult<Version> {
        Version::load(store, version_id)
    }

    /// Newest version, or `None` for an empty index.
    pub fn load_latest(store: &dyn FileStore) -> MergeResult<Option<Version>> {
        match Self::list_versions(store)?.last() {
            Some(&id) => Self::load(store, id).map(Some),
            None => {
                warn!(target: "version_loader::load_latest", "No version file found");
                Ok(None)
            }
        }
    }
}
