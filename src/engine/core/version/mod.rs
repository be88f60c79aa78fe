pub mod committer;
pub mod deploy_meta;
pub mod version;
pub mod version_loader;

pub use committer::{CleanupReport, VersionCommitter, VersionLifecycle};
pub use deploy_meta::DeployMeta;
pub use version::{Version, VersionId};
pub use version_loader::VersionLoader;
