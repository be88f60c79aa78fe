use super::segment_id::SegmentId;
use crate::engine::errors::{MergeError, MergeResult};
use serde::{Deserialize, Serialize};

/// How segments are laid out across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Topology {
    /// Level 0 holds segments in build order.
    #[default]
    Sequence,
    /// Levels are sharded into `column_count` columns by key hash.
    HashMod { column_count: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMeta {
    pub level_idx: u32,
    /// Next free position within the level.
    pub cursor: u32,
    pub segments: Vec<SegmentId>,
}

impl LevelMeta {
    pub fn new(level_idx: u32) -> Self {
        Self {
            level_idx,
            cursor: 0,
            segments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub topology: Topology,
    pub levels: Vec<LevelMeta>,
}

impl Default for LevelInfo {
    fn default() -> Self {
        Self::sequence()
    }
}

impl LevelInfo {
    pub fn sequence() -> Self {
        Self {
            topology: Topology::Sequence,
            levels: vec![LevelMeta::new(0)],
        }
    }

    pub fn hash_mod(column_count: u32, level_count: u32) -> Self {
        Self {
            topology: Topology::HashMod { column_count },
            levels: (0..level_count.max(1)).map(LevelMeta::new).collect(),
        }
    }

    /// Merge strategies only understand sequential layering.
    pub fn ensure_sequential(&self) -> MergeResult<()> {
        match self.topology {
            Topology::Sequence => Ok(()),
            other => Err(MergeError::UnsupportedTopology(format!("{:?}", other))),
        }
    }

    fn level_mut(&mut self, level_idx: u32) -> &mut LevelMeta {
        while self.levels.len() <= level_idx as usize {
            let next = self.levels.len() as u32;
            self.levels.push(LevelMeta::new(next));
        }
        &mut self.levels[level_idx as usize]
    }

    pub fn add_segment(&mut self, level_idx: u32, segment_id: SegmentId) {
        let level = self.level_mut(level_idx);
        level.segments.push(segment_id);
        level.cursor += 1;
    }

    pub fn remove_segment(&mut self, segment_id: SegmentId) -> bool {
        let mut removed = false;
        for level in &mut self.levels {
            let before = level.segments.len();
            level.segments.retain(|s| *s != segment_id);
            removed |= level.segments.len() != before;
        }
        removed
    }

    pub fn level_of(&self, segment_id: SegmentId) -> Option<u32> {
        self.levels
            .iter()
            .find(|l| l.segments.contains(&segment_id))
            .map(|l| l.level_idx)
    }

    pub fn segment_count(&self) -> usize {
        self.levels.iter().map(|l| l.segments.len()).sum()
    }
}
