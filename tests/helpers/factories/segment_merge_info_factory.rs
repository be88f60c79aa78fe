use crate::engine::core::segment::{SegmentId, SegmentMergeInfo};
use serde_json::{Value, json};
use std::collections::HashMap;

pub struct SegmentMergeInfoFactory {
    params: HashMap<String, Value>,
}

impl SegmentMergeInfoFactory {
    pub fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("segment_id".into(), json!(0));
        params.insert("doc_count".into(), json!(100));
        params.insert("deleted_doc_count".into(), json!(0));
        params.insert("byte_size".into(), json!(0));
        params.insert("base_doc_id".into(), json!(0));
        params.insert("merged".into(), json!(false));
        Self { params }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn create(self) -> SegmentMergeInfo {
        let mut info = SegmentMergeInfo::new(
            SegmentId::new(self.params["segment_id"].as_u64().unwrap() as u32),
            self.params["doc_count"].as_u64().unwrap() as u32,
            self.params["deleted_doc_count"].as_u64().unwrap() as u32,
        );
        info.byte_size = self.params["byte_size"].as_u64().unwrap();
        info.base_doc_id = self.params["base_doc_id"].as_u64().unwrap();
        info.merged = self.params["merged"].as_bool().unwrap();
        info
    }

    /// One segment per entry with ids `0..n`, no deletions and running base ids.
    pub fn create_many(doc_counts: &[u32]) -> Vec<SegmentMergeInfo> {
        let mut base = 0u64;
        doc_counts
            .iter()
            .enumerate()
            .map(|(id, &docs)| {
                let info = Self::new()
                    .with("segment_id", id as u64)
                    .with("doc_count", docs)
                    .with("base_doc_id", base)
                    .create();
                base += u64::from(docs);
                info
            })
            .collect()
    }
}
