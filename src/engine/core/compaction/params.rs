use crate::engine::errors::{MergeError, MergeResult};
use std::collections::BTreeMap;
use std::str::FromStr;

pub const MB: u64 = 1024 * 1024;

/// `key=value;key=value` strategy parameters.
///
/// Strategies take the keys they understand and call `finish`, which rejects
/// anything left over, so a typo never silently falls back to a default.
#[derive(Debug, Clone, Default)]
pub struct StrategyParams {
    strategy: String,
    entries: BTreeMap<String, String>,
}

impl StrategyParams {
    pub fn parse(strategy: &str, raw: &str) -> MergeResult<Self> {
        let mut entries = BTreeMap::new();
        for item in raw.split(';') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let Some((key, value)) = item.split_once('=') else {
                return Err(MergeError::Config(format!(
                    "{}: parameter '{}' is not key=value",
                    strategy, item
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(MergeError::Config(format!(
                    "{}: empty key in '{}'",
                    strategy, item
                )));
            }
            if entries
                .insert(key.to_string(), value.trim().to_string())
                .is_some()
            {
                return Err(MergeError::Config(format!(
                    "{}: duplicate key '{}'",
                    strategy, key
                )));
            }
        }
        Ok(Self {
            strategy: strategy.to_string(),
            entries,
        })
    }

    fn take_parsed<T: FromStr>(&mut self, key: &str, default: T) -> MergeResult<T> {
        match self.entries.remove(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|_| {
                MergeError::Config(format!(
                    "{}: invalid value '{}' for '{}'",
                    self.strategy, raw, key
                ))
            }),
        }
    }

    pub fn take_u32(&mut self, key: &str, default: u32) -> MergeResult<u32> {
        self.take_parsed(key, default)
    }

    pub fn take_u64(&mut self, key: &str, default: u64) -> MergeResult<u64> {
        self.take_parsed(key, default)
    }

    pub fn take_bool(&mut self, key: &str, default: bool) -> MergeResult<bool> {
        self.take_parsed(key, default)
    }

    pub fn finish(self) -> MergeResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        let unknown: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        Err(MergeError::Config(format!(
            "{}: unknown parameter(s) {}",
            self.strategy,
            unknown.join(", ")
        )))
    }
}
