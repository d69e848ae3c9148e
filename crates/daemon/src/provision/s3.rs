use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;

use common::RemoteTarget;

use super::{BucketProvisioner, ProvisionError, DEFAULT_REGION};

/// Provisioner talking to an S3 compatible server (MinIO, AWS, ...).
///
/// A client is built per call from the target's own endpoint and credentials,
/// since every volume may point at a different server.
#[derive(Debug, Clone)]
pub struct S3Provisioner {
    region: String,
}

impl S3Provisioner {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    fn client_for(&self, target: &RemoteTarget) -> Client {
        let credentials = Credentials::new(
            target.access_key(),
            target.secret_key(),
            None,
            None,
            "minfs-volume-options",
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .endpoint_url(target.endpoint().as_str().trim_end_matches('/'))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Client::from_conf(config)
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        // us-east-1 is the implicit default and rejects an explicit constraint
        if self.region == DEFAULT_REGION {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

impl Default for S3Provisioner {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

#[async_trait::async_trait]
impl BucketProvisioner for S3Provisioner {
    async fn ensure_bucket(&self, target: &RemoteTarget) -> Result<(), ProvisionError> {
        let client = self.client_for(target);

        match client.head_bucket().bucket(target.bucket()).send().await {
            Ok(_) => {
                tracing::info!(
                    endpoint = %target.endpoint(),
                    bucket = %target.bucket(),
                    "bucket already exists"
                );
                return Ok(());
            }
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                    || err.raw_response().map(|r| r.status().as_u16()) == Some(404);
                if !not_found {
                    return Err(ProvisionError::check(
                        target,
                        DisplayErrorContext(&err).to_string(),
                    ));
                }
            }
        }

        tracing::info!(
            endpoint = %target.endpoint(),
            bucket = %target.bucket(),
            region = %self.region,
            "creating bucket"
        );

        match client
            .create_bucket()
            .bucket(target.bucket())
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let already_exists = err
                    .as_service_error()
                    .map(|e| e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists())
                    .unwrap_or(false);
                if already_exists {
                    tracing::info!(bucket = %target.bucket(), "bucket created concurrently, continuing");
                    return Ok(());
                }
                Err(ProvisionError::create(
                    target,
                    DisplayErrorContext(&err).to_string(),
                ))
            }
        }
    }
}
