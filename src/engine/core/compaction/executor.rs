use super::encoder::EncoderRegistry;
use super::merge_meta::{BoundMergePlan, MergeMeta};
use crate::engine::core::deletion::{DeletionMapLoader, DeletionMapMerger, TargetAssignment};
use crate::engine::core::file_store::FileStore;
use crate::engine::core::segment::SegmentId;
use crate::engine::core::version::{Version, VersionCommitter};
use crate::engine::errors::{MergeError, MergeResult};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// Writes the target segments of one bound plan.
///
/// Called concurrently for different plans of the same meta; plans never
/// share sources or targets.
pub trait MergeExecutor: Send + Sync {
    fn execute(
        &self,
        store: &dyn FileStore,
        plan: &BoundMergePlan,
        encoders: &EncoderRegistry,
    ) -> MergeResult<()>;
}

/// Creates the target directories and checks every bound encoder still
/// resolves. Data files are left to the encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentDirExecutor;

impl MergeExecutor for SegmentDirExecutor {
    fn execute(
        &self,
        store: &dyn FileStore,
        plan: &BoundMergePlan,
        encoders: &EncoderRegistry,
    ) -> MergeResult<()> {
        for resource in &plan.encoders {
            encoders.get(&resource.encoder)?;
        }
        for dir in &plan.target_dirs {
            store.make_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Runs a merge meta end to end and commits the resulting version.
pub struct IndexMerger<'a> {
    committer: &'a VersionCommitter,
    encoders: &'a EncoderRegistry,
}

impl<'a> IndexMerger<'a> {
    pub fn new(committer: &'a VersionCommitter, encoders: &'a EncoderRegistry) -> Self {
        Self {
            committer,
            encoders,
        }
    }

    /// Executes every plan of `meta`, rewrites deletion data for the new
    /// segment set and commits it. Returns the committed version, or the
    /// current latest when there is nothing to merge.
    pub fn run(&self, meta: &MergeMeta, executor: &dyn MergeExecutor) -> MergeResult<Version> {
        let store = self.committer.store().as_ref();
        let latest = self
            .committer
            .latest()
            .ok_or(MergeError::VersionNotFound(meta.base_version.version_id))?;
        if meta.is_empty() {
            debug!(target: "index_merger::run", version_id = latest.version_id, "Nothing to merge");
            return Ok(latest.as_ref().clone());
        }
        for plan in &meta.plans {
            if let Some(missing) = plan.plan.source_ids().find(|s| !latest.has_segment(*s)) {
                return Err(MergeError::Corruption(format!(
                    "merge source {} no longer in latest version {}",
                    missing, latest.version_id
                )));
            }
        }

        let result = self.execute_and_commit(store, meta, &latest, executor);
        if let Err(e) = &result {
            error!(target: "index_merger::run", base_version = meta.base_version.version_id, error = %e, "Merge failed, removing partial targets");
            for target in meta.target_segments() {
                if let Err(e) = store.remove(&target.dir_name()) {
                    warn!(target: "index_merger::run", segment_id = %target, error = %e, "Failed to remove partial target");
                }
            }
        }
        result
    }

    fn execute_and_commit(
        &self,
        store: &dyn FileStore,
        meta: &MergeMeta,
        latest: &Version,
        executor: &dyn MergeExecutor,
    ) -> MergeResult<Version> {
        meta.plans
            .par_iter()
            .map(|plan| -> MergeResult<()> {
                executor.execute(store, plan, self.encoders)?;
                for (segment, info) in plan.targets() {
                    info.store(store, segment)?;
                }
                debug!(target: "index_merger::execute", targets = ?plan.target_segments, "Executed plan");
                Ok(())
            })
            .collect::<MergeResult<Vec<()>>>()?;

        // Reload so deletes applied while plans ran are carried over.
        let existing = DeletionMapLoader::load(store, latest)?;
        let active: BTreeSet<SegmentId> = latest.segments.iter().copied().collect();
        let assignments: Vec<TargetAssignment<'_>> = meta
            .plans
            .iter()
            .map(|p| TargetAssignment {
                reclaim_map: &p.reclaim_map,
                targets: &p.target_segments,
            })
            .collect();
        let merged = DeletionMapMerger::merge(&existing, &active, &assignments);

        let holder = meta
            .target_segments()
            .last()
            .copied()
            .ok_or_else(|| MergeError::Execution("merge produced no target segment".into()))?;
        for map in merged.values() {
            map.store(store, holder)?;
        }

        let mut next = latest.derive(self.committer.next_version_id());
        for plan in &meta.plans {
            for source in plan.plan.source_ids() {
                next.remove_segment(source);
            }
            for target in &plan.target_segments {
                next.add_segment_at_level(plan.plan.target.level_idx, *target);
            }
        }
        self.committer.commit(&next)?;
        info!(
            target: "index_merger::run",
            base_version = meta.base_version.version_id,
            version_id = next.version_id,
            merged = meta.task.merged_segments().len(),
            targets = ?meta.target_segments(),
            deletion_maps = merged.len(),
            "Merge committed"
        );
        Ok(next)
    }
}
