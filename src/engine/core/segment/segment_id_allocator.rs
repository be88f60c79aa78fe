use super::segment_id::SegmentId;

/// Hands out segment ids above every id ever seen, so ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct SegmentIdAllocator {
    next: u32,
}

impl SegmentIdAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from every known id: version members plus directories found on disk.
    pub fn from_existing_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = SegmentId>,
    {
        let next = ids
            .into_iter()
            .map(|id| id.get().saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { next }
    }

    /// Seed from raw directory names, ignoring anything that is not a segment dir.
    pub fn from_dir_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_existing_ids(names.into_iter().filter_map(SegmentId::from_dir_name))
    }

    pub fn peek(&self) -> SegmentId {
        SegmentId::new(self.next)
    }

    pub fn allocate(&mut self) -> SegmentId {
        let id = SegmentId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
