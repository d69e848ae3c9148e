use clap::Args;

pub mod create;
pub mod inspect;
pub mod list;
pub mod remove;

use crate::cli::op::Op;

crate::command_enum! {
    (Create, create::Create),
    (List, list::List),
    (Inspect, inspect::Inspect),
    (Remove, remove::Remove),
}

pub type VolumeCommand = Command;

/// Manage volumes of a running plugin
#[derive(Args, Debug, Clone)]
pub struct Volume {
    #[command(subcommand)]
    pub command: VolumeCommand,
}

#[async_trait::async_trait]
impl Op for Volume {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
