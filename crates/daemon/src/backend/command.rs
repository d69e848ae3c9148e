use std::path::Path;
use std::process::Output;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use common::RemoteTarget;

use super::{BackendError, MountBackend};

/// Environment variable the minfs mount helper reads the access key from.
pub const ACCESS_KEY_ENV: &str = "MINFS_ACCESS_KEY";
/// Environment variable the minfs mount helper reads the secret key from.
pub const SECRET_KEY_ENV: &str = "MINFS_SECRET_KEY";

/// External tools used to attach and detach buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Program invoked as `<mount_program> -t <fs_type> <bucket_url> <path>`
    pub mount_program: String,
    /// Filesystem type passed to `-t`
    pub fs_type: String,
    /// Program invoked as `<unmount_program> <path>`
    pub unmount_program: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mount_program: "mount".to_string(),
            fs_type: "minfs".to_string(),
            unmount_program: "umount".to_string(),
        }
    }
}

/// Backend shelling out to the minfs mount helper.
///
/// Credentials are handed to the helper through its environment, set on the
/// child process only. They never touch the daemon's own environment and are
/// never logged.
#[derive(Debug, Clone, Default)]
pub struct CommandBackend {
    config: BackendConfig,
}

impl CommandBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl MountBackend for CommandBackend {
    async fn bind(&self, target: &RemoteTarget, local_path: &Path) -> Result<(), BackendError> {
        let bucket_url = target.bucket_url();
        tracing::debug!(
            program = %self.config.mount_program,
            fs_type = %self.config.fs_type,
            bucket_url = %bucket_url,
            mountpoint = %local_path.display(),
            "running mount command"
        );

        let mut command = Command::new(&self.config.mount_program);
        command
            .arg("-t")
            .arg(&self.config.fs_type)
            .arg(&bucket_url)
            .arg(local_path)
            .env(ACCESS_KEY_ENV, target.access_key())
            .env(SECRET_KEY_ENV, target.secret_key());

        run(&self.config.mount_program, command).await
    }

    async fn unbind(&self, local_path: &Path) -> Result<(), BackendError> {
        tracing::debug!(
            program = %self.config.unmount_program,
            mountpoint = %local_path.display(),
            "running unmount command"
        );

        let mut command = Command::new(&self.config.unmount_program);
        command.arg(local_path);

        run(&self.config.unmount_program, command).await
    }
}

async fn run(program: &str, mut command: Command) -> Result<(), BackendError> {
    let Output { status, stderr, .. } = command
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| BackendError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if status.success() {
        return Ok(());
    }

    Err(BackendError::Failed {
        program: program.to_string(),
        status,
        stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> RemoteTarget {
        RemoteTarget::new("https://s3.example.com", "imgs", "AK", "SK").unwrap()
    }

    fn backend(mount_program: &str, unmount_program: &str) -> CommandBackend {
        CommandBackend::new(BackendConfig {
            mount_program: mount_program.to_string(),
            fs_type: "minfs".to_string(),
            unmount_program: unmount_program.to_string(),
        })
    }

    #[tokio::test]
    async fn test_successful_commands() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend("true", "true");

        backend.bind(&target(), dir.path()).await.unwrap();
        backend.unbind(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend("false", "false");

        let err = backend.bind(&target(), dir.path()).await.unwrap_err();
        assert!(matches!(err, BackendError::Failed { ref program, .. } if program == "false"));

        let err = backend.unbind(dir.path()).await.unwrap_err();
        assert!(matches!(err, BackendError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_failure_carries_diagnostic_text() {
        // `ls -t minfs <url> <path>` fails on the missing "minfs" operand and says so on stderr
        let dir = tempfile::tempdir().unwrap();
        let backend = backend("ls", "true");

        let err = backend.bind(&target(), dir.path()).await.unwrap_err();
        match err {
            BackendError::Failed { stderr, .. } => assert!(stderr.contains("minfs"), "{stderr}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend("/nonexistent/minfs-mount", "/nonexistent/minfs-umount");

        let err = backend.bind(&target(), dir.path()).await.unwrap_err();
        assert!(matches!(err, BackendError::Spawn { .. }));

        let err = backend.unbind(dir.path()).await.unwrap_err();
        assert!(matches!(err, BackendError::Spawn { .. }));
    }

    #[test]
    fn test_default_config() {
        let config = BackendConfig::default();
        assert_eq!(config.mount_program, "mount");
        assert_eq!(config.fs_type, "minfs");
        assert_eq!(config.unmount_program, "umount");
    }
}
