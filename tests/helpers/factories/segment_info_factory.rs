use crate::engine::core::segment::SegmentInfo;
use serde_json::{Value, json};
use std::collections::HashMap;

pub struct SegmentInfoFactory {
    params: HashMap<String, Value>,
}

impl SegmentInfoFactory {
    pub fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("doc_count".into(), json!(100));
        params.insert("byte_size".into(), json!(4096));
        params.insert("locator".into(), json!(""));
        params.insert("timestamp".into(), json!(1_000_000));
        params.insert("merged".into(), json!(false));
        params.insert("truncate_profiles".into(), json!([]));
        Self { params }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn create(self) -> SegmentInfo {
        let mut info = SegmentInfo::new(self.params["doc_count"].as_u64().unwrap() as u32);
        info.byte_size = self.params["byte_size"].as_u64().unwrap();
        info.locator = self.params["locator"].as_str().unwrap().to_string();
        info.timestamp = self.params["timestamp"].as_i64().unwrap();
        info.merged = self.params["merged"].as_bool().unwrap();
        info.truncate_profiles = self.params["truncate_profiles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        info
    }
}
