use std::path::PathBuf;

use clap::Parser;
use url::Url;

mod cli;

use cli::op::{Op, OpContext};
use cli::ops::{Daemon, Health, Version, Volume};

crate::command_enum! {
    (Daemon, Daemon),
    (Volume, Volume),
    (Health, Health),
    (Version, Version),
}

#[derive(Parser, Debug)]
#[command(name = "minfs", version, about = "Docker volume plugin for MinFS buckets")]
struct Args {
    /// Admin API address of a running plugin
    #[arg(
        long,
        global = true,
        env = "MINFS_REMOTE",
        default_value = "http://127.0.0.1:9180"
    )]
    remote: Url,

    /// TOML config file
    #[arg(long, global = true, env = "MINFS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = match OpContext::new(&args.remote, args.config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
