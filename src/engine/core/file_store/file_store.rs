use crate::engine::errors::StoreError;

/// Suffix of in-flight files written by `atomic_write`; listings skip them.
pub const TEMP_SUFFIX: &str = ".__tmp__";

/// Hierarchical store the engine persists versions, segments and patches into.
///
/// Paths are `/`-separated and relative to the store root.
pub trait FileStore: Send + Sync {
    /// Names of the direct children of `dir`, sorted, temp files excluded.
    /// A missing directory lists as empty.
    fn list_dir(&self, dir: &str) -> Result<Vec<String>, StoreError>;

    fn exists(&self, path: &str) -> bool;

    fn is_dir(&self, path: &str) -> bool;

    fn make_dir_all(&self, dir: &str) -> Result<(), StoreError>;

    /// Removes a file or a whole directory tree. Removing a missing path is Ok.
    fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Writes `data` so that readers observe either the old content or all of it.
    fn atomic_write(&self, path: &str, data: &[u8]) -> Result<(), StoreError>;

    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;
}

/// Joins store-relative path components.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    }
}
