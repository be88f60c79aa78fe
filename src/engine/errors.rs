use std::io;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Failures of the file store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path escapes the store root: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors raised by planning, committing and patch discovery.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Invalid merge configuration: {0}")]
    Config(String),

    #[error("Unsupported level topology: {0}")]
    UnsupportedTopology(String),

    #[error("Doc id space overflow: projected {projected} docs exceeds limit {limit}")]
    DocIdOverflow { projected: u64, limit: u64 },

    #[error("Truncate profile '{profile}' references unknown field '{field}'")]
    UnresolvedTruncateProfile { profile: String, field: String },

    #[error("Index corruption: {0}")]
    Corruption(String),

    #[error("Segment {0} referenced by version is missing")]
    SegmentMissing(u32),

    #[error("Version {0} not found")]
    VersionNotFound(u32),

    #[error("Version {version_id} is not newer than latest version {latest}")]
    StaleVersion { version_id: u32, latest: u32 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Merge execution failed: {0}")]
    Execution(String),
}

impl From<io::Error> for MergeError {
    fn from(err: io::Error) -> Self {
        MergeError::Store(StoreError::Io(err))
    }
}

impl From<serde_json::Error> for MergeError {
    fn from(err: serde_json::Error) -> Self {
        MergeError::Store(StoreError::Json(err))
    }
}

impl MergeError {
    /// Configuration, planning-invariant and corruption errors abort the whole
    /// operation. Store and execution errors may be retried by the caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MergeError::Store(_) | MergeError::Execution(_))
    }

    pub fn log_error(&self) {
        match self {
            MergeError::Config(e) => {
                error!("Invalid merge configuration: {}", e);
            }
            MergeError::UnsupportedTopology(e) => {
                error!("Unsupported level topology: {}", e);
            }
            MergeError::DocIdOverflow { projected, limit } => {
                error!(projected, limit, "Doc id space overflow");
            }
            MergeError::UnresolvedTruncateProfile { profile, field } => {
                error!(%profile, %field, "Truncate profile references unknown field");
            }
            MergeError::Corruption(e) => {
                error!("Index corruption: {}", e);
            }
            MergeError::SegmentMissing(id) => {
                error!(segment_id = id, "Segment referenced by version is missing");
            }
            MergeError::VersionNotFound(id) => {
                warn!(version_id = id, "Version not found");
            }
            MergeError::StaleVersion {
                version_id,
                latest,
            } => {
                error!(version_id, latest, "Version is not newer than latest");
            }
            MergeError::Store(e) => {
                error!("Store error: {}", e);
                debug!("Store error details: {:?}", e);
            }
            MergeError::Execution(e) => {
                error!("Merge execution failed: {}", e);
            }
        }
    }
}

pub type MergeResult<T> = Result<T, MergeError>;
