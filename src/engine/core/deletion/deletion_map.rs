use crate::engine::core::file_store::{FileStore, file_store::join};
use crate::engine::core::segment::SegmentId;
use crate::engine::errors::{MergeError, MergeResult};
use crate::shared::storage_header::{FileKind, encode_with_header, strip_header};
use roaring::RoaringBitmap;

pub const DELETION_MAP_DIR: &str = "deletionmap";
pub const DELETION_DATA_PREFIX: &str = "data_";

/// Tombstones of one sealed segment, as local doc ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeletionMap {
    segment_id: SegmentId,
    bitmap: RoaringBitmap,
}

impl DeletionMap {
    pub fn new(segment_id: SegmentId) -> Self {
        Self {
            segment_id,
            bitmap: RoaringBitmap::new(),
        }
    }

    pub fn from_ids<I>(segment_id: SegmentId, ids: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            segment_id,
            bitmap: ids.into_iter().collect(),
        }
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    /// Returns false when the doc was already deleted.
    pub fn delete(&mut self, local_doc_id: u32) -> bool {
        self.bitmap.insert(local_doc_id)
    }

    pub fn is_deleted(&self, local_doc_id: u32) -> bool {
        self.bitmap.contains(local_doc_id)
    }

    pub fn deleted_count(&self) -> u32 {
        self.bitmap.len() as u32
    }

    /// Deleted docs below `doc_count`; ids past the segment end are ignored.
    pub fn deleted_count_within(&self, doc_count: u32) -> u32 {
        self.bitmap.iter().take_while(|id| *id < doc_count).count() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.bitmap.iter()
    }

    pub fn union_with(&mut self, other: &DeletionMap) {
        self.bitmap |= &other.bitmap;
    }

    /// `segment_<holder>/deletionmap/data_<target>`: tombstones for `target`
    /// recorded while `holder` was built.
    pub fn data_path(holder: SegmentId, target: SegmentId) -> String {
        join(
            &join(&holder.dir_name(), DELETION_MAP_DIR),
            &format!("{}{}", DELETION_DATA_PREFIX, target.get()),
        )
    }

    pub fn parse_data_file_name(name: &str) -> Option<SegmentId> {
        let digits = name.strip_prefix(DELETION_DATA_PREFIX)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().map(SegmentId::new)
    }

    pub fn encode(&self) -> MergeResult<Vec<u8>> {
        let mut payload = Vec::with_capacity(self.bitmap.serialized_size());
        self.bitmap.serialize_into(&mut payload)?;
        Ok(encode_with_header(FileKind::DeletionMap, &payload))
    }

    pub fn decode(segment_id: SegmentId, bytes: &[u8]) -> MergeResult<Self> {
        let payload = strip_header(FileKind::DeletionMap, bytes)
            .map_err(|e| MergeError::Corruption(format!("deletion data for segment {}: {}", segment_id, e)))?;
        let bitmap = RoaringBitmap::deserialize_from(payload)
            .map_err(|e| MergeError::Corruption(format!("deletion data for segment {}: {}", segment_id, e)))?;
        Ok(Self { segment_id, bitmap })
    }

    /// Writes this map into `holder`'s deletion directory.
    pub fn store(&self, store: &dyn FileStore, holder: SegmentId) -> MergeResult<()> {
        store.atomic_write(&Self::data_path(holder, self.segment_id), &self.encode()?)?;
        Ok(())
    }

    pub fn load(store: &dyn FileStore, path: &str, segment_id: SegmentId) -> MergeResult<Self> {
        let bytes = store.read(path)?;
        Self::decode(segment_id, &bytes)
    }
}
