//! Remote bucket provisioning
//!
//! When a volume is created for the first time, the bucket it points at is
//! checked on the remote server and created if it is missing. This happens
//! once, at create time, and never when a volume is mounted.

#[cfg(feature = "s3")]
mod s3;

#[cfg(feature = "s3")]
pub use s3::S3Provisioner;

use common::RemoteTarget;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Make sure the bucket of a target exists on its server.
#[async_trait::async_trait]
pub trait BucketProvisioner: std::fmt::Debug + Send + Sync {
    async fn ensure_bucket(&self, target: &RemoteTarget) -> Result<(), ProvisionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to check whether bucket {bucket} exists on {endpoint}: {message}")]
    Check {
        endpoint: String,
        bucket: String,
        message: String,
    },
    #[error("failed to create bucket {bucket} on {endpoint}: {message}")]
    Create {
        endpoint: String,
        bucket: String,
        message: String,
    },
}

impl ProvisionError {
    pub fn check(target: &RemoteTarget, message: impl Into<String>) -> Self {
        Self::Check {
            endpoint: target.endpoint().to_string(),
            bucket: target.bucket().to_string(),
            message: message.into(),
        }
    }

    pub fn create(target: &RemoteTarget, message: impl Into<String>) -> Self {
        Self::Create {
            endpoint: target.endpoint().to_string(),
            bucket: target.bucket().to_string(),
            message: message.into(),
        }
    }
}

/// Provisioner that assumes every bucket already exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipProvisioner;

#[async_trait::async_trait]
impl BucketProvisioner for SkipProvisioner {
    async fn ensure_bucket(&self, target: &RemoteTarget) -> Result<(), ProvisionError> {
        tracing::debug!(bucket = %target.bucket(), "bucket provisioning disabled, skipping");
        Ok(())
    }
}
