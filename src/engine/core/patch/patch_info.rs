use crate::engine::core::segment::SegmentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const PATCH_DIR: &str = "patch";
pub const PATCH_FILE_SUFFIX: &str = ".patch";

/// Kind of value patch; each kind lives in its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchType {
    Attribute,
    Index,
}

impl PatchType {
    pub fn dir_name(&self) -> &'static str {
        match self {
            PatchType::Attribute => "attribute",
            PatchType::Index => "index",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "attribute" => Some(PatchType::Attribute),
            "index" => Some(PatchType::Index),
            _ => None,
        }
    }
}

impl Display for PatchType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One patch file found in a shard, in that shard's local numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFileInfo {
    pub shard_idx: usize,
    /// Segment whose build produced the patch; also its apply sequence.
    pub src_segment: SegmentId,
    /// Segment the patch applies to.
    pub dst_segment: SegmentId,
    pub path: String,
}

/// A patch addressed in the unified id space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualPatch {
    pub src_virtual: u32,
    pub dst_virtual: u32,
    pub file: PatchFileInfo,
}

/// Destination virtual id → patches in apply order. Later entries win.
pub type PatchInfos = BTreeMap<u32, Vec<VirtualPatch>>;

/// Deletion data grouped the same way as value patches.
pub type DeletePatchInfos = BTreeMap<u32, Vec<VirtualPatch>>;

/// What to do with a patch whose destination is not in the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingPatch {
    /// Report corruption.
    Reject,
    /// Skip it; used for deletion data of segments merged away.
    Skip,
}
