pub mod multi_part_patch_finder;
pub mod patch_file_finder;
pub mod patch_info;
pub mod virtual_segment;

pub use multi_part_patch_finder::{MultiPartPatchFinder, ShardDirectory};
pub use patch_file_finder::PatchFileFinder;
pub use patch_info::{
    DanglingPatch, DeletePatchInfos, PatchFileInfo, PatchInfos, PatchType, VirtualPatch,
};
pub use virtual_segment::VirtualSegmentTable;
