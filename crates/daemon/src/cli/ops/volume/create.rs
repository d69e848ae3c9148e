use std::collections::HashMap;
use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use common::target::{ACCESS_KEY_OPTION, BUCKET_OPTION, ENDPOINT_OPTION, SECRET_KEY_OPTION};
use minfs_daemon::http_server::api::client::ApiError;
use minfs_daemon::http_server::plugin::CreateRequest;

/// Create a volume backed by a bucket
#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Name of the volume
    pub name: String,

    /// Object storage server, e.g. https://play.min.io
    #[arg(long)]
    pub endpoint: String,

    #[arg(long)]
    pub bucket: String,

    #[arg(long, env = "MINFS_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    #[arg(long, env = "MINFS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,
}

impl Create {
    fn options(&self) -> HashMap<String, String> {
        HashMap::from([
            (ENDPOINT_OPTION.to_string(), self.endpoint.clone()),
            (BUCKET_OPTION.to_string(), self.bucket.clone()),
            (ACCESS_KEY_OPTION.to_string(), self.access_key.clone()),
            (SECRET_KEY_OPTION.to_string(), self.secret_key.clone()),
        ])
    }
}

#[derive(Debug)]
pub struct CreateOutput {
    pub name: String,
    pub bucket: String,
}

impl fmt::Display for CreateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} volume {} (bucket {})",
            "Created".green().bold(),
            self.name.bold(),
            self.bucket
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Create {
    type Error = CreateError;
    type Output = CreateOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let request = CreateRequest {
            name: self.name.clone(),
            opts: Some(self.options()),
        };
        client.call(request).await?;

        Ok(CreateOutput {
            name: self.name.clone(),
            bucket: self.bucket.clone(),
        })
    }
}
