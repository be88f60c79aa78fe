use crate::engine::core::segment::SegmentId;
use crate::engine::core::version::Version;
use serde_json::{Value, json};
use std::collections::HashMap;

pub struct VersionFactory {
    params: HashMap<String, Value>,
}

impl VersionFactory {
    pub fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("version_id".into(), json!(0));
        params.insert("segments".into(), json!([]));
        Self { params }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn create(self) -> Version {
        let segments = self.params["segments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| SegmentId::new(v.as_u64().unwrap() as u32));
        Version::with_segments(self.params["version_id"].as_u64().unwrap() as u32, segments)
    }
}
