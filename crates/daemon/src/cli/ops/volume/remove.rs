use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use minfs_daemon::http_server::api::client::ApiError;
use minfs_daemon::http_server::plugin::RemoveRequest;

/// Remove an unused volume and its mountpoint
#[derive(Args, Debug, Clone)]
pub struct Remove {
    pub name: String,
}

#[derive(Debug)]
pub struct RemoveOutput {
    pub name: String,
}

impl fmt::Display for RemoveOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} volume {}", "Removed".green().bold(), self.name.bold())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Remove {
    type Error = RemoveError;
    type Output = RemoveOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        client
            .call(RemoveRequest {
                name: self.name.clone(),
            })
            .await?;

        Ok(RemoveOutput {
            name: self.name.clone(),
        })
    }
}
