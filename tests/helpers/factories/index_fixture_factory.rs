use crate::engine::core::deletion::DeletionMap;
use crate::engine::core::file_store::{FileStore, LocalFileStore};
use crate::engine::core::segment::{SegmentId, SegmentInfo};
use crate::engine::core::version::{Version, VersionCommitter};
use std::sync::Arc;
use tempfile::TempDir;

/// An index laid out on disk inside a temp dir.
pub struct IndexFixture {
    pub dir: TempDir,
    pub store: Arc<LocalFileStore>,
}

impl IndexFixture {
    pub fn store(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    pub fn shared_store(&self) -> Arc<dyn FileStore> {
        self.store.clone()
    }

    pub fn committer(&self) -> VersionCommitter {
        VersionCommitter::open(self.shared_store()).unwrap()
    }

    pub fn has_segment_dir(&self, id: u32) -> bool {
        self.store.is_dir(&SegmentId::new(id).dir_name())
    }

    pub fn has_version(&self, id: u32) -> bool {
        self.store.exists(&Version::file_name(id))
    }
}

pub struct IndexFixtureFactory {
    segments: Vec<(u32, SegmentInfo)>,
    deletions: Vec<(u32, u32, Vec<u32>)>,
    versions: Vec<(u32, Vec<u32>)>,
}

impl IndexFixtureFactory {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            deletions: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn with_segment(self, id: u32, doc_count: u32) -> Self {
        let mut info = SegmentInfo::new(doc_count);
        info.byte_size = u64::from(doc_count) * 64;
        self.with_segment_info(id, info)
    }

    pub fn with_segment_info(mut self, id: u32, info: SegmentInfo) -> Self {
        self.segments.push((id, info));
        self
    }

    /// Deletes `docs` of segment `target`, recorded in segment `holder`.
    pub fn with_deletions(mut self, holder: u32, target: u32, docs: &[u32]) -> Self {
        self.deletions.push((holder, target, docs.to_vec()));
        self
    }

    pub fn with_version(mut self, id: u32, segments: &[u32]) -> Self {
        self.versions.push((id, segments.to_vec()));
        self
    }

    pub fn create(self) -> IndexFixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalFileStore::new(dir.path()));

        for (id, info) in &self.segments {
            let id = SegmentId::new(*id);
            store.make_dir_all(&id.dir_name()).unwrap();
            info.store(store.as_ref(), id).unwrap();
        }
        for (holder, target, docs) in &self.deletions {
            DeletionMap::from_ids(SegmentId::new(*target), docs.iter().copied())
                .store(store.as_ref(), SegmentId::new(*holder))
                .unwrap();
        }
        for (id, segments) in &self.versions {
            Version::with_segments(*id, segments.iter().map(|s| SegmentId::new(*s)))
                .store(store.as_ref())
                .unwrap();
        }
        IndexFixture { dir, store }
    }
}
