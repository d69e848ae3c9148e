//! Mount backends
//!
//! A [`MountBackend`] attaches a remote bucket at a local path and detaches
//! it again. The registry decides *when* that happens; the backend only does
//! it, once per call, and reports failure verbatim.
//!
//! - [`CommandBackend`]: runs the external `mount -t minfs` / `umount` tools
//! - [`ensure_directory`] / [`remove_directory`]: mountpoint preparation and cleanup
//! - [`ensure_root`]: mount root preparation at startup

mod command;
mod directory;

pub use command::{BackendConfig, CommandBackend};
pub use directory::{ensure_directory, ensure_root, remove_directory, DirectoryError};

use std::path::Path;
use std::process::ExitStatus;

use common::RemoteTarget;

/// Attach and detach remote buckets at local paths.
///
/// Implementations make a single attempt per call. Retrying is up to the caller.
#[async_trait::async_trait]
pub trait MountBackend: std::fmt::Debug + Send + Sync {
    /// Attach `target` at `local_path`. The directory already exists.
    async fn bind(&self, target: &RemoteTarget, local_path: &Path) -> Result<(), BackendError>;

    /// Detach whatever is attached at `local_path`.
    async fn unbind(&self, local_path: &Path) -> Result<(), BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}
