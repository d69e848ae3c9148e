use std::sync::Arc;

use crate::backend::{CommandBackend, MountBackend};
use crate::provision::{BucketProvisioner, SkipProvisioner};
use crate::registry::MountRegistry;
use crate::service_config::Config;

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct State {
    registry: Arc<MountRegistry>,
}

impl State {
    pub fn new(registry: Arc<MountRegistry>) -> Self {
        Self { registry }
    }

    /// Wire the production backend and provisioner from `config`.
    pub fn from_config(config: &Config) -> Self {
        let backend: Arc<dyn MountBackend> = Arc::new(CommandBackend::new(config.backend.clone()));
        let registry = MountRegistry::new(&config.mount_root, backend, provisioner_for(config));
        Self::new(Arc::new(registry))
    }

    pub fn registry(&self) -> &Arc<MountRegistry> {
        &self.registry
    }
}

#[cfg(feature = "s3")]
fn provisioner_for(config: &Config) -> Arc<dyn BucketProvisioner> {
    if config.provision_buckets {
        tracing::debug!(region = %config.region, "bucket provisioning enabled");
        Arc::new(crate::provision::S3Provisioner::new(config.region.clone()))
    } else {
        tracing::info!("bucket provisioning disabled by configuration");
        Arc::new(SkipProvisioner)
    }
}

#[cfg(not(feature = "s3"))]
fn provisioner_for(config: &Config) -> Arc<dyn BucketProvisioner> {
    if config.provision_buckets {
        tracing::warn!("built without the s3 feature, buckets will not be provisioned");
    }
    Arc::new(SkipProvisioner)
}
