use super::encoder::EncoderRegistry;
use super::merge_config::MergeConfig;
use super::merge_meta::{BoundMergePlan, MergeMeta};
use super::merge_plan::{MergePlan, MergeTask, PlanReason};
use super::policy::{MergeStrategy, MergeStrategyFactory};
use super::reclaim_map::{ReclaimMap, ReclaimSource};
use super::truncate::{SchemaProvider, pending_truncate_segments, validate_profiles};
use crate::engine::core::deletion::{DeletionMap, DeletionMapLoader};
use crate::engine::core::file_store::FileStore;
use crate::engine::core::segment::{SegmentId, SegmentIdAllocator, SegmentInfo, SegmentMergeInfo};
use crate::engine::core::version::Version;
use crate::engine::errors::{MergeError, MergeResult, StoreError};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Planning snapshot of a version: per-segment metadata and tombstones.
pub struct VersionSnapshot {
    pub infos: BTreeMap<SegmentId, SegmentInfo>,
    pub deletions: BTreeMap<SegmentId, DeletionMap>,
    /// Planning descriptors in version order.
    pub merge_infos: Vec<SegmentMergeInfo>,
}

impl VersionSnapshot {
    pub fn load(store: &dyn FileStore, version: &Version) -> MergeResult<Self> {
        let mut infos = BTreeMap::new();
        for segment in &version.segments {
            let info = match SegmentInfo::load(store, *segment) {
                Ok(info) => info,
                Err(StoreError::NotFound(_)) => return Err(MergeError::SegmentMissing(segment.get())),
                Err(e) => return Err(e.into()),
            };
            infos.insert(*segment, info);
        }
        let deletions = DeletionMapLoader::load(store, version)?;

        let mut base_doc_id = 0u64;
        let mut merge_infos = Vec::with_capacity(infos.len());
        for (segment, info) in &infos {
            let deleted = deletions
                .get(segment)
                .map_or(0, |d| d.deleted_count_within(info.doc_count));
            merge_infos.push(SegmentMergeInfo::from_segment_info(
                *segment,
                info,
                deleted,
                base_doc_id,
            ));
            base_doc_id += u64::from(info.doc_count);
        }
        Ok(Self {
            infos,
            deletions,
            merge_infos,
        })
    }
}

/// Turns a version into a bound merge meta: runs the strategy, adds truncate
/// rebuilds, checks the doc id space and allocates target segments.
pub struct MergeMetaCreator<'a> {
    store: &'a dyn FileStore,
    config: &'a MergeConfig,
    strategy: Box<dyn MergeStrategy>,
    encoders: &'a EncoderRegistry,
}

impl<'a> MergeMetaCreator<'a> {
    pub fn new(
        store: &'a dyn FileStore,
        config: &'a MergeConfig,
        schema: Option<&dyn SchemaProvider>,
        encoders: &'a EncoderRegistry,
    ) -> MergeResult<Self> {
        config.check_max_doc_id()?;
        let strategy = MergeStrategyFactory::create(
            &config.strategy,
            &config.strategy_param,
            &config.optimize_param,
        )?;
        if !config.truncate_profiles.is_empty() {
            let schema = schema.ok_or_else(|| {
                MergeError::Config("truncate profiles configured without a schema".into())
            })?;
            validate_profiles(&config.truncate_profiles, schema)?;
        }
        for name in &config.encoders {
            encoders.get(name)?;
        }
        Ok(Self {
            store,
            config,
            strategy,
            encoders,
        })
    }

    pub fn strategy(&self) -> &dyn MergeStrategy {
        self.strategy.as_ref()
    }

    pub fn create(&self, version: &Version, optimize: bool) -> MergeResult<MergeMeta> {
        version.level_info.ensure_sequential()?;
        let snapshot = VersionSnapshot::load(self.store, version)?;

        let pending = pending_truncate_segments(&self.config.truncate_profiles, &snapshot.infos);
        let input: Vec<SegmentMergeInfo> = snapshot
            .merge_infos
            .iter()
            .filter(|s| !pending.contains(&s.segment_id))
            .cloned()
            .collect();

        let mut task = if optimize {
            self.strategy.create_optimize_task(&input, &version.level_info)?
        } else {
            self.strategy.create_merge_task(&input, &version.level_info)?
        };
        self.add_truncate_plans(&mut task, &snapshot, &pending);

        self.check_doc_id_space(&task, &snapshot)?;

        let plans = self.bind(&task, version, &snapshot)?;
        info!(
            target: "merge_meta_creator::create",
            version_id = version.version_id,
            strategy = self.strategy.name(),
            optimize,
            plans = plans.len(),
            truncate_rebuilds = pending.len(),
            "Created merge meta"
        );
        Ok(MergeMeta {
            base_version: version.clone(),
            target_version_id: version.version_id + 1,
            task,
            plans,
        })
    }

    fn add_truncate_plans(
        &self,
        task: &mut MergeTask,
        snapshot: &VersionSnapshot,
        pending: &BTreeSet<SegmentId>,
    ) {
        for info in snapshot
            .merge_infos
            .iter()
            .filter(|s| pending.contains(&s.segment_id))
        {
            if task.contains_segment(info.segment_id) {
                continue;
            }
            debug!(target: "merge_meta_creator::add_truncate_plans", segment_id = %info.segment_id, "Segment lacks truncate profiles, scheduling rebuild");
            task.push(MergePlan::from_infos(PlanReason::TruncateRebuild, [info]));
        }
    }

    /// Unmerged segments keep every doc id, merged outputs only hold live docs.
    fn check_doc_id_space(&self, task: &MergeTask, snapshot: &VersionSnapshot) -> MergeResult<()> {
        let unmerged: u64 = snapshot
            .merge_infos
            .iter()
            .filter(|s| !task.contains_segment(s.segment_id))
            .map(|s| u64::from(s.doc_count))
            .sum();
        let merged: u64 = task.plans().iter().map(MergePlan::projected_live_docs).sum();
        let projected = unmerged + merged;
        if projected > self.config.max_doc_id {
            return Err(MergeError::DocIdOverflow {
                projected,
                limit: self.config.max_doc_id,
            });
        }
        Ok(())
    }

    fn bind(
        &self,
        task: &MergeTask,
        version: &Version,
        snapshot: &VersionSnapshot,
    ) -> MergeResult<Vec<BoundMergePlan>> {
        let on_disk = self.store.list_dir("")?;
        let mut allocator = SegmentIdAllocator::from_existing_ids(
            version
                .segments
                .iter()
                .copied()
                .chain(on_disk.iter().filter_map(|n| SegmentId::from_dir_name(n))),
        );
        let profiles: BTreeSet<String> = self
            .config
            .truncate_profiles
            .iter()
            .map(|p| p.name.clone())
            .collect();

        let mut bound = Vec::with_capacity(task.len());
        for plan in task.plans() {
            let target_count = plan.target_count.max(1) as usize;
            let target_segments: Vec<SegmentId> =
                (0..target_count).map(|_| allocator.allocate()).collect();
            let target_dirs = target_segments.iter().map(|s| s.dir_name()).collect();

            let sources: Vec<ReclaimSource<'_>> = plan
                .sources
                .iter()
                .map(|s| ReclaimSource {
                    segment_id: s.segment_id,
                    doc_count: s.doc_count,
                    deletions: snapshot.deletions.get(&s.segment_id),
                })
                .collect();
            let reclaim_map = ReclaimMap::build(&sources, target_count);

            let target_infos = self.target_infos(plan, &reclaim_map, snapshot, &profiles);

            let mut encoders = Vec::with_capacity(self.config.encoders.len());
            for name in &self.config.encoders {
                encoders.push(self.encoders.get(name)?.bind(plan, &target_segments)?);
            }

            debug!(
                target: "merge_meta_creator::bind",
                sources = ?plan.source_ids().collect::<Vec<_>>(),
                targets = ?target_segments,
                live_docs = reclaim_map.live_doc_count(),
                "Bound merge plan"
            );
            bound.push(BoundMergePlan {
                plan: plan.clone(),
                target_segments,
                target_dirs,
                target_infos,
                reclaim_map,
                encoders,
            });
        }
        Ok(bound)
    }

    fn target_infos(
        &self,
        plan: &MergePlan,
        reclaim_map: &ReclaimMap,
        snapshot: &VersionSnapshot,
        profiles: &BTreeSet<String>,
    ) -> Vec<SegmentInfo> {
        let source_infos: Vec<&SegmentInfo> = plan
            .source_ids()
            .filter_map(|id| snapshot.infos.get(&id))
            .collect();
        let total_docs: u64 = plan.sources.iter().map(|s| u64::from(s.doc_count)).sum();
        let total_bytes = plan.total_byte_size();
        let locator = source_infos
            .iter()
            .map(|i| i.locator.clone())
            .max()
            .unwrap_or_default();
        let timestamp = source_infos.iter().map(|i| i.timestamp).max().unwrap_or(0);

        reclaim_map
            .target_doc_counts()
            .iter()
            .map(|&docs| {
                let mut info = SegmentInfo::new(docs);
                info.byte_size = if total_docs == 0 {
                    0
                } else {
                    total_bytes * u64::from(docs) / total_docs
                };
                info.locator = locator.clone();
                info.timestamp = timestamp;
                info.merged = true;
                info.level_idx = plan.target.level_idx;
                info.column_idx = plan.target.column_idx;
                info.truncate_profiles = profiles.clone();
                info
            })
            .collect()
    }
}
