use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use minfs_daemon::http_server::api::client::ApiError;
use minfs_daemon::http_server::plugin::{GetRequest, GetResponse, Volume};

/// Show the state of one volume
#[derive(Args, Debug, Clone)]
pub struct Inspect {
    pub name: String,
}

#[derive(Debug)]
pub struct InspectOutput {
    pub volume: Volume,
}

impl fmt::Display for InspectOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.volume.name.bold())?;
        write!(f, "  {} {}", "mountpoint:".dimmed(), self.volume.mountpoint)?;
        if let Some(status) = &self.volume.status {
            writeln!(f)?;
            writeln!(f, "  {} {}", "endpoint:".dimmed(), status.endpoint)?;
            writeln!(f, "  {} {}", "bucket:".dimmed(), status.bucket)?;
            writeln!(f, "  {} {}", "references:".dimmed(), status.ref_count)?;
            let mounted = if status.bound {
                "yes".green().to_string()
            } else {
                "no".yellow().to_string()
            };
            write!(f, "  {} {}", "mounted:".dimmed(), mounted)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Inspect {
    type Error = InspectError;
    type Output = InspectOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: GetResponse = client
            .call(GetRequest {
                name: self.name.clone(),
            })
            .await?;

        Ok(InspectOutput {
            volume: response.volume,
        })
    }
}
