use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Prefix of on-disk segment directory names.
pub const SEGMENT_DIR_PREFIX: &str = "segment_";

/// Monotonic segment identifier. Ids are never reused once allocated.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(pub u32);

impl SegmentId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Directory name for on-disk layout.
    #[inline]
    pub fn dir_name(&self) -> String {
        format!("{}{}", SEGMENT_DIR_PREFIX, self.0)
    }

    /// Parses a segment directory name back into an id.
    #[inline]
    pub fn from_dir_name(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(SEGMENT_DIR_PREFIX)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().map(Self::new)
    }
}

impl From<u32> for SegmentId {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl Display for SegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
