//! Fakes shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use common::RemoteTarget;
use minfs_daemon::backend::{BackendError, MountBackend};
use minfs_daemon::provision::{BucketProvisioner, ProvisionError};
use minfs_daemon::{MountRegistry, ServiceState};

/// Backend that records calls instead of mounting anything.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub binds: AtomicUsize,
    pub unbinds: AtomicUsize,
    pub fail_bind: AtomicBool,
    pub fail_unbind: AtomicBool,
    /// Number of bind/unbind calls running right now, and the most seen at once
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    delay: Option<Duration>,
    pub bound_paths: Mutex<Vec<PathBuf>>,
}

impl RecordingBackend {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }

    pub fn unbinds(&self) -> usize {
        self.unbinds.load(Ordering::SeqCst)
    }

    pub fn set_fail_bind(&self, fail: bool) {
        self.fail_bind.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_unbind(&self, fail: bool) {
        self.fail_unbind.store(fail, Ordering::SeqCst);
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl MountBackend for RecordingBackend {
    async fn bind(&self, _target: &RemoteTarget, local_path: &Path) -> Result<(), BackendError> {
        self.enter().await;
        self.binds.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_bind.load(Ordering::SeqCst) {
            Err(tool_failure("mount", "permission denied"))
        } else {
            self.bound_paths
                .lock()
                .unwrap()
                .push(local_path.to_path_buf());
            Ok(())
        };
        self.exit();
        result
    }

    async fn unbind(&self, _local_path: &Path) -> Result<(), BackendError> {
        self.enter().await;
        self.unbinds.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_unbind.load(Ordering::SeqCst) {
            Err(tool_failure("umount", "target is busy"))
        } else {
            Ok(())
        };
        self.exit();
        result
    }
}

/// The error a mount tool exiting with status 1 would produce.
fn tool_failure(program: &str, stderr: &str) -> BackendError {
    BackendError::Failed {
        program: program.to_string(),
        status: ExitStatus::from_raw(1 << 8),
        stderr: stderr.to_string(),
    }
}

/// Provisioner that counts calls and can be told to fail.
#[derive(Debug, Default)]
pub struct FakeProvisioner {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeProvisioner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl BucketProvisioner for FakeProvisioner {
    async fn ensure_bucket(&self, target: &RemoteTarget) -> Result<(), ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProvisionError::create(target, "AccessDenied"));
        }
        Ok(())
    }
}

/// A registry rooted in a temporary directory, plus handles on its fakes.
pub struct TestRegistry {
    pub registry: Arc<MountRegistry>,
    pub backend: Arc<RecordingBackend>,
    pub provisioner: Arc<FakeProvisioner>,
    pub root: TempDir,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::with_backend(RecordingBackend::default())
    }

    pub fn with_backend(backend: RecordingBackend) -> Self {
        let root = TempDir::new().unwrap();
        let backend = Arc::new(backend);
        let provisioner = Arc::new(FakeProvisioner::default());
        let registry = Arc::new(MountRegistry::new(
            root.path(),
            backend.clone(),
            provisioner.clone(),
        ));
        Self {
            registry,
            backend,
            provisioner,
            root,
        }
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::new(self.registry.clone())
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

pub fn options(endpoint: &str, bucket: &str, access_key: &str, secret_key: &str) -> HashMap<String, String> {
    HashMap::from([
        ("endpoint".to_string(), endpoint.to_string()),
        ("bucket".to_string(), bucket.to_string()),
        ("access-key".to_string(), access_key.to_string()),
        ("secret-key".to_string(), secret_key.to_string()),
    ])
}

/// Options for the MinIO playground bucket used throughout the tests.
pub fn play_options(bucket: &str) -> HashMap<String, String> {
    options("https://play.min.io", bucket, "AK", "SK")
}
