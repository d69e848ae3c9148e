use std::convert::Infallible;

use clap::Args;

/// Print the version and build details of this binary
#[derive(Args, Debug, Clone)]
pub struct Version;

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        Ok(minfs_daemon::build_info().to_string())
    }
}
