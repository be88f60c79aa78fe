use crate::engine::core::segment::SegmentId;
use crate::engine::core::version::Version;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ShardSlot {
    offset: u32,
    segments: Vec<SegmentId>,
    ordinals: HashMap<SegmentId, u32>,
}

/// Offset table unifying independently numbered shards into one id space.
///
/// Shard `i` owns virtual ids `[offset_i, offset_i + k_i)` where `k_i` is the
/// number of segments in its version; its `n`-th segment (version order) maps
/// to `offset_i + n`.
#[derive(Debug, Clone, Default)]
pub struct VirtualSegmentTable {
    shards: Vec<ShardSlot>,
}

impl VirtualSegmentTable {
    pub fn build<'a, I>(versions: I) -> Self
    where
        I: IntoIterator<Item = &'a Version>,
    {
        let mut offset = 0u32;
        let mut shards = Vec::new();
        for version in versions {
            let ordinals = version
                .segments
                .iter()
                .enumerate()
                .map(|(n, s)| (*s, n as u32))
                .collect();
            shards.push(ShardSlot {
                offset,
                segments: version.segments.clone(),
                ordinals,
            });
            offset += version.segments.len() as u32;
        }
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn offset(&self, shard_idx: usize) -> Option<u32> {
        self.shards.get(shard_idx).map(|s| s.offset)
    }

    pub fn total_segments(&self) -> u32 {
        self.shards
            .last()
            .map_or(0, |s| s.offset + s.segments.len() as u32)
    }

    pub fn to_virtual(&self, shard_idx: usize, local: SegmentId) -> Option<u32> {
        let slot = self.shards.get(shard_idx)?;
        slot.ordinals.get(&local).map(|n| slot.offset + n)
    }

    pub fn to_local(&self, virtual_id: u32) -> Option<(usize, SegmentId)> {
        let shard_idx = self
            .shards
            .partition_point(|s| s.offset <= virtual_id)
            .checked_sub(1)?;
        let slot = &self.shards[shard_idx];
        slot.segments
            .get((virtual_id - slot.offset) as usize)
            .map(|s| (shard_idx, *s))
    }
}
