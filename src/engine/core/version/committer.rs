use super::deploy_meta::DeployMeta;
use super::version::{Version, VersionId};
use super::version_loader::VersionLoader;
use crate::engine::core::file_store::FileStore;
use crate::engine::core::segment::SegmentId;
use crate::engine::errors::{MergeError, MergeResult};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a version id sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionLifecycle {
    /// Never persisted.
    Uncommitted,
    /// Persisted but not yet swapped in as latest by this committer.
    Committed,
    /// Inside the keep window or reserved.
    Reachable,
    /// Persisted but eligible for collection.
    Collectable,
    /// Persisted once and since collected.
    Removed,
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed_versions: Vec<VersionId>,
    pub removed_segments: Vec<SegmentId>,
    /// Per-file removals that failed and were skipped.
    pub failures: usize,
}

impl CleanupReport {
    pub fn is_noop(&self) -> bool {
        self.removed_versions.is_empty() && self.removed_segments.is_empty()
    }
}

/// Commits versions and collects the ones that fall out of retention.
pub struct VersionCommitter {
    store: Arc<dyn FileStore>,
    latest: RwLock<Option<Arc<Version>>>,
    commit_lock: Mutex<()>,
}

impl VersionCommitter {
    /// Opens a committer over `store`, adopting its newest version as latest.
    pub fn open(store: Arc<dyn FileStore>) -> MergeResult<Self> {
        let latest = VersionLoader::load_latest(store.as_ref())?.map(Arc::new);
        info!(
            target: "version_committer::open",
            latest = ?latest.as_ref().map(|v| v.version_id),
            "Opened version committer"
        );
        Ok(Self {
            store,
            latest: RwLock::new(latest),
            commit_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    pub fn latest(&self) -> Option<Arc<Version>> {
        self.latest.read().clone()
    }

    pub fn latest_id(&self) -> Option<VersionId> {
        self.latest.read().as_ref().map(|v| v.version_id)
    }

    /// Id the next committed version should carry.
    pub fn next_version_id(&self) -> VersionId {
        self.latest_id().map_or(0, |id| id + 1)
    }

    /// Persists `version` and swaps it in as latest. On any failure the
    /// previous latest stays authoritative.
    pub fn commit(&self, version: &Version) -> MergeResult<()> {
        let _guard = self.commit_lock.lock();

        if let Some(latest) = self.latest_id() {
            if version.version_id <= latest {
                return Err(MergeError::StaleVersion {
                    version_id: version.version_id,
                    latest,
                });
            }
        }

        for segment in &version.segments {
            if !self.store.is_dir(&segment.dir_name()) {
                return Err(MergeError::SegmentMissing(segment.get()));
            }
        }

        DeployMeta::for_version(version).store(self.store.as_ref())?;
        if let Err(e) = version.store(self.store.as_ref()) {
            warn!(
                target: "version_committer::commit",
                version_id = version.version_id,
                error = %e,
                "Version write failed, keeping previous latest"
            );
            let _ = self.store.remove(&DeployMeta::file_name(version.version_id));
            return Err(e);
        }

        *self.latest.write() = Some(Arc::new(version.clone()));
        info!(
            target: "version_committer::commit",
            version_id = version.version_id,
            segments = ?version.segments,
            "Committed version"
        );
        Ok(())
    }

    pub fn lifecycle_of(
        &self,
        version_id: VersionId,
        keep_version_count: usize,
        reserved: &BTreeSet<VersionId>,
    ) -> MergeResult<VersionLifecycle> {
        let on_disk = VersionLoader::list_versions(self.store.as_ref())?;
        let latest = self.latest_id();
        if !on_disk.contains(&version_id) {
            return Ok(match latest {
                Some(latest) if version_id <= latest => VersionLifecycle::Removed,
                _ => VersionLifecycle::Uncommitted,
            });
        }
        if latest.map_or(true, |latest| version_id > latest) {
            return Ok(VersionLifecycle::Committed);
        }
        let kept = Self::keep_set(&on_disk, keep_version_count, reserved);
        Ok(if kept.contains(&version_id) {
            VersionLifecycle::Reachable
        } else {
            VersionLifecycle::Collectable
        })
    }

    fn keep_set(
        on_disk: &[VersionId],
        keep_version_count: usize,
        reserved: &BTreeSet<VersionId>,
    ) -> BTreeSet<VersionId> {
        let keep = keep_version_count.max(1);
        let mut kept: BTreeSet<VersionId> = on_disk.iter().rev().take(keep).copied().collect();
        kept.extend(on_disk.iter().filter(|id| reserved.contains(id)));
        kept
    }

    /// Keeps the `keep_version_count` newest versions plus `reserved`, removes
    /// every other version, then removes segments no kept version references.
    /// A keep count of zero still keeps the latest version.
    pub fn clean_versions(
        &self,
        keep_version_count: usize,
        reserved: &BTreeSet<VersionId>,
    ) -> MergeResult<CleanupReport> {
        let _guard = self.commit_lock.lock();
        let on_disk = VersionLoader::list_versions(self.store.as_ref())?;
        if on_disk.is_empty() {
            return Ok(CleanupReport::default());
        }
        let kept = Self::keep_set(&on_disk, keep_version_count, reserved);
        let doomed: Vec<VersionId> = on_disk
            .iter()
            .copied()
            .filter(|id| !kept.contains(id))
            .collect();
        info!(
            target: "version_committer::clean_versions",
            keep_version_count,
            kept = ?kept,
            doomed = ?doomed,
            "Planning version cleanup"
        );
        self.collect(&kept, &doomed)
    }

    /// Removes `version_id` and every older version, then the segments only they
    /// referenced. Returns `Ok(false)` without touching anything unless
    /// `version_id` is strictly older than the latest version.
    pub fn clean_version_and_before(&self, version_id: VersionId) -> MergeResult<bool> {
        let _guard = self.commit_lock.lock();
        let on_disk = VersionLoader::list_versions(self.store.as_ref())?;
        let Some(&latest) = on_disk.last() else {
            return Ok(false);
        };
        if version_id >= latest {
            warn!(
                target: "version_committer::clean_version_and_before",
                version_id,
                latest,
                "Target is not older than latest version, nothing to clean"
            );
            return Ok(false);
        }
        let (doomed, kept): (Vec<VersionId>, Vec<VersionId>) =
            on_disk.iter().copied().partition(|id| *id <= version_id);
        let kept: BTreeSet<VersionId> = kept.into_iter().collect();
        self.collect(&kept, &doomed)?;
        Ok(true)
    }

    /// Removes `doomed` version files first, then segments referenced by no
    /// version in `kept`. Segment ids above every id referenced in this pass
    /// belong to builds or merges that have not committed yet and are left alone.
    fn collect(
        &self,
        kept: &BTreeSet<VersionId>,
        doomed: &[VersionId],
    ) -> MergeResult<CleanupReport> {
        let store = self.store.as_ref();
        let mut report = CleanupReport::default();

        let latest_id = kept.iter().next_back().copied();
        let mut referenced: HashSet<SegmentId> = HashSet::new();
        let mut ceiling: Option<SegmentId> = None;
        let mut kept_readable = true;

        for &id in kept {
            match Version::load(store, id) {
                Ok(version) => {
                    ceiling = ceiling.max(version.last_segment());
                    referenced.extend(version.segments.iter().copied());
                }
                Err(e) if Some(id) == latest_id => {
                    warn!(target: "version_committer::collect", version_id = id, error = %e, "Latest version unreadable, aborting cleanup");
                    return Err(e);
                }
                Err(e) => {
                    warn!(target: "version_committer::collect", version_id = id, error = %e, "Kept version unreadable, segment removal disabled");
                    kept_readable = false;
                }
            }
        }

        for &id in doomed {
            if let Ok(version) = Version::load(store, id) {
                ceiling = ceiling.max(version.last_segment());
            }
            let mut ok = true;
            for path in [DeployMeta::file_name(id), Version::file_name(id)] {
                if let Err(e) = store.remove(&path) {
                    warn!(target: "version_committer::collect", %path, error = %e, "Failed to remove version file");
                    report.failures += 1;
                    ok = false;
                }
            }
            if ok {
                debug!(target: "version_committer::collect", version_id = id, "Removed version");
                report.removed_versions.push(id);
            }
        }

        if !kept_readable {
            return Ok(report);
        }
        let Some(ceiling) = ceiling else {
            return Ok(report);
        };

        for name in store.list_dir("")? {
            let Some(segment) = SegmentId::from_dir_name(&name) else {
                continue;
            };
            if segment > ceiling || referenced.contains(&segment) {
                continue;
            }
            match store.remove(&name) {
                Ok(()) => {
                    debug!(target: "version_committer::collect", segment_id = %segment, "Removed unreferenced segment");
                    report.removed_segments.push(segment);
                }
                Err(e) => {
                    warn!(target: "version_committer::collect", segment_id = %segment, error = %e, "Failed to remove segment directory");
                    report.failures += 1;
                }
            }
        }
        report.removed_segments.sort();

        info!(
            target: "version_committer::collect",
            removed_versions = ?report.removed_versions,
            removed_segments = ?report.removed_segments,
            failures = report.failures,
            "Cleanup finished"
        );
        Ok(report)
    }
}
