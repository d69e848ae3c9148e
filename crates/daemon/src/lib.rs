//! Docker volume plugin that mounts MinIO / S3 buckets through MinFS.
//!
//! The plugin keeps an in-memory [`registry::MountRegistry`] of named
//! volumes, mounts a bucket when the first container attaches and unmounts
//! it when the last one detaches.

pub mod backend;
pub mod http_server;
pub mod logging;
pub mod process;
pub mod provision;
pub mod registry;
pub mod service_config;
pub mod service_state;

pub use process::{spawn_service, start_service, RunningService, ShutdownHandle};
pub use registry::{MountInfo, MountRegistry, RegistryError, VolumeCounts};
pub use service_config::Config as ServiceConfig;
pub use service_state::State as ServiceState;

/// Daemon-specific build info that uses the daemon's BUILD_FEATURES.
///
/// `common::build_info!()` expands here, so the version and features are the
/// daemon's own rather than those of the common crate.
pub fn build_info() -> common::version::BuildInfo {
    common::build_info!()
}
