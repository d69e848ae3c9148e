//! Volume registry
//!
//! The registry is the single source of truth for every named volume the
//! plugin knows about. It enforces the lifecycle
//!
//! ```text
//! absent -> created (0 refs, unbound) -> attached (n refs, bound) -> created -> absent
//! ```
//!
//! and the reference counting that decides when the bucket is actually
//! mounted: only the 0 -> 1 attach binds and only the 1 -> 0 detach unbinds.
//!
//! # Locking
//!
//! Mutating operations (create, attach, detach, remove) hold the write lock for
//! their whole duration, including bucket provisioning and the bind/unbind
//! call. At most one bind or unbind is in flight at any time and reference
//! count changes are atomic with the external operation. Lookups share the
//! read lock.
//!
//! State lives in memory only and starts empty on every process start.

mod record;

pub use record::{MountInfo, MountRecord};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use common::{matches_existing, validate, validate_name, ConflictError, RemoteTarget, ValidationError};

use crate::backend::{ensure_directory, remove_directory, BackendError, DirectoryError, MountBackend};
use crate::provision::{BucketProvisioner, ProvisionError};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("volume {name}: {source}")]
    Conflict {
        name: String,
        #[source]
        source: ConflictError,
    },
    #[error("volume {0} not found")]
    NotFound(String),
    #[error("failed to mount volume {name}: {source}")]
    Bind {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("failed to unmount volume {name}: {source}")]
    Unbind {
        name: String,
        #[source]
        source: BackendError,
    },
    #[error("volume {name}: {source}")]
    Provision {
        name: String,
        #[source]
        source: ProvisionError,
    },
    #[error("volume {name} is currently used by {ref_count} container(s)")]
    InUse { name: String, ref_count: usize },
    #[error("volume {name}: {source}")]
    Filesystem {
        name: String,
        #[source]
        source: DirectoryError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCounts {
    pub volumes: usize,
    pub mounted: usize,
}

/// Registry of named volumes, shared by all request handlers.
#[derive(Debug)]
pub struct MountRegistry {
    root: PathBuf,
    backend: Arc<dyn MountBackend>,
    provisioner: Arc<dyn BucketProvisioner>,
    mounts: RwLock<HashMap<String, MountRecord>>,
}

impl MountRegistry {
    /// Create an empty registry placing mountpoints under `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        backend: Arc<dyn MountBackend>,
        provisioner: Arc<dyn BucketProvisioner>,
    ) -> Self {
        Self {
            root: root.into(),
            backend,
            provisioner,
            mounts: RwLock::new(HashMap::new()),
        }
    }

    /// Create a volume from raw volume options.
    ///
    /// Options are validated before anything else happens; see
    /// [`MountRegistry::create_with_target`] for the rest.
    pub async fn create(
        &self,
        name: &str,
        options: Option<&HashMap<String, String>>,
    ) -> Result<(), RegistryError> {
        validate_name(name)?;
        let target = validate(options)?;
        self.create_with_target(name, target).await
    }

    /// Create a volume bound to `target`.
    ///
    /// A new name provisions the bucket and records the volume. An existing
    /// name succeeds without side effects if its target is identical, and
    /// fails with [`RegistryError::Conflict`] otherwise. Nothing is recorded
    /// when provisioning fails.
    pub async fn create_with_target(
        &self,
        name: &str,
        target: RemoteTarget,
    ) -> Result<(), RegistryError> {
        validate_name(name)?;
        let mut mounts = self.mounts.write().await;

        if let Some(existing) = mounts.get(name) {
            matches_existing(existing.target(), &target).map_err(|source| {
                RegistryError::Conflict {
                    name: name.to_string(),
                    source,
                }
            })?;
            tracing::debug!(volume = %name, "volume already exists with the same target");
            return Ok(());
        }

        self.provisioner
            .ensure_bucket(&target)
            .await
            .map_err(|source| RegistryError::Provision {
                name: name.to_string(),
                source,
            })?;

        let record = MountRecord::new(name, target, &self.root);
        tracing::info!(
            volume = %name,
            endpoint = %record.target().endpoint(),
            bucket = %record.target().bucket(),
            mountpoint = %record.local_path().display(),
            "volume created"
        );
        mounts.insert(name.to_string(), record);
        Ok(())
    }

    /// A consumer starts using the volume. Returns the mountpoint.
    ///
    /// The first consumer mounts the bucket; later ones only take a reference.
    /// A failed mount leaves the volume unbound with no references.
    pub async fn attach(&self, name: &str) -> Result<PathBuf, RegistryError> {
        let mut mounts = self.mounts.write().await;
        let record = mounts
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        ensure_directory(record.local_path())
            .await
            .map_err(|source| RegistryError::Filesystem {
                name: name.to_string(),
                source,
            })?;

        if record.ref_count() > 0 {
            record.acquire();
            tracing::debug!(volume = %name, ref_count = record.ref_count(), "volume already mounted");
            return Ok(record.local_path().to_path_buf());
        }

        self.backend
            .bind(record.target(), record.local_path())
            .await
            .map_err(|source| RegistryError::Bind {
                name: name.to_string(),
                source,
            })?;
        record.mark_bound();

        tracing::info!(
            volume = %name,
            mountpoint = %record.local_path().display(),
            bucket = %record.target().bucket(),
            "volume mounted"
        );
        Ok(record.local_path().to_path_buf())
    }

    /// A consumer stops using the volume.
    ///
    /// The last consumer unmounts the bucket. A failed unmount leaves the
    /// reference in place so the detach can be retried.
    pub async fn detach(&self, name: &str) -> Result<(), RegistryError> {
        let mut mounts = self.mounts.write().await;
        let record = mounts
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if record.ref_count() > 1 {
            record.release();
            tracing::debug!(volume = %name, ref_count = record.ref_count(), "volume still in use");
            return Ok(());
        }

        self.backend
            .unbind(record.local_path())
            .await
            .map_err(|source| RegistryError::Unbind {
                name: name.to_string(),
                source,
            })?;
        record.mark_unbound();

        tracing::info!(
            volume = %name,
            mountpoint = %record.local_path().display(),
            "volume unmounted"
        );
        Ok(())
    }

    /// Forget a volume and delete its mountpoint.
    ///
    /// Refused while any consumer holds a reference. If the mountpoint cannot
    /// be deleted the volume is kept.
    pub async fn remove(&self, name: &str) -> Result<(), RegistryError> {
        let mut mounts = self.mounts.write().await;
        let record = mounts
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if record.ref_count() != 0 {
            tracing::warn!(volume = %name, ref_count = record.ref_count(), "refusing to remove volume in use");
            return Err(RegistryError::InUse {
                name: name.to_string(),
                ref_count: record.ref_count(),
            });
        }

        remove_directory(record.local_path())
            .await
            .map_err(|source| RegistryError::Filesystem {
                name: name.to_string(),
                source,
            })?;

        mounts.remove(name);
        tracing::info!(volume = %name, "volume removed");
        Ok(())
    }

    /// Mountpoint of a volume.
    pub async fn lookup(&self, name: &str) -> Result<PathBuf, RegistryError> {
        let mounts = self.mounts.read().await;
        mounts
            .get(name)
            .map(|record| record.local_path().to_path_buf())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// All volumes with their mountpoints, in no particular order.
    pub async fn enumerate(&self) -> Vec<(String, PathBuf)> {
        let mounts = self.mounts.read().await;
        mounts
            .values()
            .map(|record| (record.name().to_string(), record.local_path().to_path_buf()))
            .collect()
    }

    /// Current state of a volume.
    pub async fn inspect(&self, name: &str) -> Result<MountInfo, RegistryError> {
        let mounts = self.mounts.read().await;
        mounts
            .get(name)
            .map(MountRecord::info)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Number of known volumes and how many of them are mounted.
    ///
    /// Returns `None` instead of waiting while a create, attach, detach or
    /// remove is in progress.
    pub fn try_counts(&self) -> Option<VolumeCounts> {
        let mounts = self.mounts.try_read().ok()?;
        Some(VolumeCounts {
            volumes: mounts.len(),
            mounted: mounts.values().filter(|record| record.is_bound()).count(),
        })
    }

    /// Current state of every volume, sorted by name.
    pub async fn snapshot(&self) -> Vec<MountInfo> {
        let mounts = self.mounts.read().await;
        let mut infos: Vec<MountInfo> = mounts.values().map(MountRecord::info).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}
