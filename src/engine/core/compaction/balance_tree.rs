use super::merge_plan::{MergePlan, MergeTask, PlanReason};
use super::optimize::OptimizeMergeStrategy;
use super::params::StrategyParams;
use super::policy::MergeStrategy;
use crate::engine::core::segment::{LevelInfo, SegmentMergeInfo};
use crate::engine::errors::{MergeError, MergeResult};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::{debug, info};

pub const BALANCE_TREE_STRATEGY: &str = "balance_tree";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTreeParams {
    /// Capacity in live docs of the lowest layer.
    pub base_doc_count: u32,
    /// Segments with more live docs never join a tiered merge.
    pub max_doc_count: u32,
    /// Members a layer holds before it merges; also the capacity ratio
    /// between consecutive layers.
    pub conflict_segment_number: u32,
    /// A member deleted above this percentage merges its layer early.
    pub conflict_delete_percent: u32,
    /// Oversized segments at or below this many live docs may still be
    /// rewritten alone to reclaim deletions.
    pub max_valid_doc_count: u32,
}

impl Default for BalanceTreeParams {
    fn default() -> Self {
        Self {
            base_doc_count: 102_400,
            max_doc_count: i32::MAX as u32,
            conflict_segment_number: 2,
            conflict_delete_percent: 100,
            max_valid_doc_count: u32::MAX,
        }
    }
}

impl BalanceTreeParams {
    pub fn parse(raw: &str) -> MergeResult<Self> {
        let defaults = Self::default();
        let mut params = StrategyParams::parse(BALANCE_TREE_STRATEGY, raw)?;
        let parsed = Self {
            base_doc_count: params.take_u32("base-doc-count", defaults.base_doc_count)?,
            max_doc_count: params.take_u32("max-doc-count", defaults.max_doc_count)?,
            conflict_segment_number: params
                .take_u32("conflict-segment-number", defaults.conflict_segment_number)?,
            conflict_delete_percent: params
                .take_u32("conflict-delete-percent", defaults.conflict_delete_percent)?,
            max_valid_doc_count: params
                .take_u32("max-valid-doc-count", defaults.max_valid_doc_count)?,
        };
        params.finish()?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> MergeResult<()> {
        if self.base_doc_count == 0 {
            return Err(MergeError::Config(
                "balance_tree: base-doc-count must be positive".into(),
            ));
        }
        if self.conflict_segment_number < 2 {
            return Err(MergeError::Config(format!(
                "balance_tree: conflict-segment-number must be at least 2, got {}",
                self.conflict_segment_number
            )));
        }
        if self.conflict_delete_percent > 100 {
            return Err(MergeError::Config(format!(
                "balance_tree: conflict-delete-percent must be within 0..=100, got {}",
                self.conflict_delete_percent
            )));
        }
        Ok(())
    }
}

/// A real segment or the virtual result of merging a layer.
#[derive(Debug, Clone)]
struct TreeNode {
    sources: Vec<SegmentMergeInfo>,
    live_docs: u64,
    deletion_bps: u32,
    deletion_conflict: bool,
    /// Position of the node's first source in the input.
    seq: usize,
    merged: bool,
}

impl TreeNode {
    fn leaf(seq: usize, info: &SegmentMergeInfo, delete_percent: u32) -> Self {
        Self {
            sources: vec![info.clone()],
            live_docs: u64::from(info.live_doc_count()),
            deletion_bps: info.deletion_bps(),
            deletion_conflict: info.deletion_exceeds(delete_percent),
            seq,
            merged: false,
        }
    }

    fn merge(nodes: Vec<TreeNode>) -> Self {
        let seq = nodes.iter().map(|n| n.seq).min().unwrap_or(0);
        let mut sources: Vec<SegmentMergeInfo> = nodes.into_iter().flat_map(|n| n.sources).collect();
        sources.sort_by_key(|s| s.segment_id);
        let live_docs = sources.iter().map(|s| u64::from(s.live_doc_count())).sum();
        Self {
            sources,
            live_docs,
            deletion_bps: 0,
            deletion_conflict: false,
            seq,
            merged: true,
        }
    }
}

/// Heap order: deletion conflicts first, then worst deletion ratio, then
/// smallest, then oldest.
struct HeapEntry(TreeNode);

impl HeapEntry {
    fn key(&self) -> (bool, u32, Reverse<u64>, Reverse<usize>) {
        (
            self.0.deletion_conflict,
            self.0.deletion_bps,
            Reverse(self.0.live_docs),
            Reverse(self.0.seq),
        )
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Default)]
struct Layer {
    heap: BinaryHeap<HeapEntry>,
}

impl Layer {
    fn push(&mut self, node: TreeNode) {
        self.heap.push(HeapEntry(node));
    }

    fn peek(&self) -> Option<&TreeNode> {
        self.heap.peek().map(|e| &e.0)
    }

    fn pop(&mut self) -> Option<TreeNode> {
        self.heap.pop().map(|e| e.0)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    /// Members in heap order, leaving the layer empty.
    fn take_all(&mut self) -> Vec<TreeNode> {
        std::iter::from_fn(|| self.pop()).collect()
    }
}

/// Tiered merging over layers of geometrically growing capacity.
///
/// Segments are fed oldest first into the lowest layer whose capacity covers
/// their live docs. A layer that fills up, or that holds a member deleted above
/// the conflict percentage, merges all of its members into one virtual node
/// which then cascades into the layer its size fits.
#[derive(Debug, Clone)]
pub struct BalanceTreeMergeStrategy {
    params: BalanceTreeParams,
    optimize: OptimizeMergeStrategy,
}

impl BalanceTreeMergeStrategy {
    pub fn new(params: BalanceTreeParams, optimize: OptimizeMergeStrategy) -> Self {
        Self { params, optimize }
    }

    pub fn from_param(raw: &str, optimize: OptimizeMergeStrategy) -> MergeResult<Self> {
        BalanceTreeParams::parse(raw).map(|p| Self::new(p, optimize))
    }

    pub fn params(&self) -> &BalanceTreeParams {
        &self.params
    }

    /// Lowest layer whose capacity `base * ratio^k` is at least `live_docs`.
    fn layer_of(&self, live_docs: u64) -> usize {
        let ratio = u64::from(self.params.conflict_segment_number);
        let mut capacity = u64::from(self.params.base_doc_count);
        let mut layer = 0;
        while live_docs > capacity {
            capacity = capacity.saturating_mul(ratio);
            layer += 1;
        }
        layer
    }

    fn qualifies(&self, layer: &Layer) -> bool {
        layer.len() >= self.params.conflict_segment_number as usize
            || layer.peek().is_some_and(|top| top.deletion_conflict)
    }

    /// Pushes `node` and resolves the cascade it triggers.
    fn insert(&self, layers: &mut Vec<Layer>, finished: &mut Vec<TreeNode>, node: TreeNode) {
        let mut pending = Some(node);
        while let Some(node) = pending.take() {
            let idx = self.layer_of(node.live_docs);
            if layers.len() <= idx {
                layers.resize_with(idx + 1, Layer::default);
            }
            layers[idx].push(node);
            if !self.qualifies(&layers[idx]) {
                continue;
            }
            let merged = TreeNode::merge(layers[idx].take_all());
            debug!(
                target: "balance_tree::insert",
                layer = idx,
                sources = merged.sources.len(),
                live_docs = merged.live_docs,
                "Layer merged"
            );
            if merged.live_docs > u64::from(self.params.max_doc_count) {
                finished.push(merged);
            } else {
                pending = Some(merged);
            }
        }
    }

    fn plan(&self, infos: &[SegmentMergeInfo]) -> MergeTask {
        let mut layers: Vec<Layer> = Vec::new();
        let mut finished: Vec<TreeNode> = Vec::new();
        let mut reclaims: Vec<TreeNode> = Vec::new();

        for (seq, info) in infos.iter().enumerate() {
            let node = TreeNode::leaf(seq, info, self.params.conflict_delete_percent);
            if info.live_doc_count() > self.params.max_doc_count {
                if node.deletion_conflict && info.live_doc_count() <= self.params.max_valid_doc_count
                {
                    reclaims.push(node);
                }
                continue;
            }
            self.insert(&mut layers, &mut finished, node);
        }

        let mut nodes: Vec<(TreeNode, PlanReason)> = finished
            .into_iter()
            .chain(layers.iter_mut().flat_map(|l| l.take_all()))
            .filter(|n| n.merged)
            .map(|n| {
                let reason = if n.sources.len() == 1 {
                    PlanReason::DeletionReclaim
                } else {
                    PlanReason::Tiered
                };
                (n, reason)
            })
            .chain(reclaims.into_iter().map(|n| (n, PlanReason::DeletionReclaim)))
            .collect();
        nodes.sort_by_key(|(n, _)| n.sources.first().map(|s| s.segment_id));

        let mut task = MergeTask::new();
        for (node, reason) in nodes {
            task.push(MergePlan::from_infos(reason, &node.sources));
        }
        task
    }
}

impl MergeStrategy for BalanceTreeMergeStrategy {
    fn name(&self) -> &'static str {
        BALANCE_TREE_STRATEGY
    }

    fn create_merge_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        level_info.ensure_sequential()?;
        let task = self.plan(infos);
        info!(
            target: "balance_tree::create_merge_task",
            segments = infos.len(),
            plans = task.len(),
            "Planned tiered merge"
        );
        Ok(task)
    }

    fn create_optimize_task(
        &self,
        infos: &[SegmentMergeInfo],
        level_info: &LevelInfo,
    ) -> MergeResult<MergeTask> {
        level_info.ensure_sequential()?;
        Ok(self.optimize.optimize(infos))
    }
}
