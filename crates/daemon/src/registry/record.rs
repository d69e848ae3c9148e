use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use common::RemoteTarget;

/// Bookkeeping for one named volume.
///
/// `name`, `target` and `local_path` are fixed at creation. `ref_count` and
/// `bound` only change while the registry holds its write lock, and always
/// together: `bound` implies `ref_count >= 1`, and `ref_count == 0` implies
/// not bound.
#[derive(Debug, Clone)]
pub struct MountRecord {
    name: String,
    target: RemoteTarget,
    local_path: PathBuf,
    ref_count: usize,
    bound: bool,
}

impl MountRecord {
    pub(super) fn new(name: &str, target: RemoteTarget, root: &Path) -> Self {
        Self {
            name: name.to_string(),
            target,
            local_path: root.join(name),
            ref_count: 0,
            bound: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// First consumer attached and the bucket is mounted.
    pub(super) fn mark_bound(&mut self) {
        self.ref_count = 1;
        self.bound = true;
    }

    /// Last consumer detached and the bucket is unmounted.
    pub(super) fn mark_unbound(&mut self) {
        self.ref_count = 0;
        self.bound = false;
    }

    pub(super) fn acquire(&mut self) {
        self.ref_count += 1;
    }

    pub(super) fn release(&mut self) {
        self.ref_count = self.ref_count.saturating_sub(1);
    }

    pub fn info(&self) -> MountInfo {
        MountInfo {
            name: self.name.clone(),
            mountpoint: self.local_path.clone(),
            endpoint: self.target.endpoint().to_string(),
            bucket: self.target.bucket().to_string(),
            ref_count: self.ref_count,
            bound: self.bound,
        }
    }
}

/// Point-in-time view of a volume. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountInfo {
    pub name: String,
    pub mountpoint: PathBuf,
    pub endpoint: String,
    pub bucket: String,
    pub ref_count: usize,
    pub bound: bool,
}
