pub mod file_store;
pub mod local;

pub use file_store::{FileStore, TEMP_SUFFIX};
pub use local::LocalFileStore;
