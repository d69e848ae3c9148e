use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

use minfs_daemon::service_config::{parse_toggle, ConfigError, FileConfig};
use minfs_daemon::{logging, spawn_service, ServiceConfig};

/// Run the volume plugin service in the foreground
#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Directory under which volumes are mounted
    #[arg(long, alias = "mountroot", env = "MINFS_MOUNT_ROOT")]
    pub mount_root: Option<PathBuf>,

    /// Unix socket Docker connects to
    #[arg(long, env = "MINFS_SOCKET")]
    pub socket: Option<PathBuf>,

    /// Also serve the API on this TCP address, for the admin commands
    #[arg(long, env = "MINFS_API_ADDR")]
    pub api_addr: Option<SocketAddr>,

    /// Region used when creating buckets
    #[arg(long, env = "MINFS_REGION")]
    pub region: Option<String>,

    /// Do not check for or create buckets when volumes are created
    #[arg(long)]
    pub no_provision: bool,

    /// Write logs to a daily rolling file in this directory
    #[arg(long, env = "MINFS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbose logging. The DEBUG environment variable has the same effect.
    #[arg(long)]
    pub debug: bool,
}

impl Daemon {
    /// Layer command line values over the config file.
    fn resolve(&self, file: FileConfig) -> ServiceConfig {
        let mut file = file;
        if let Some(mount_root) = &self.mount_root {
            file.mount_root = mount_root.clone();
        }
        if let Some(socket) = &self.socket {
            file.socket_path = socket.clone();
        }
        if let Some(addr) = self.api_addr {
            file.api_listen_addr = Some(addr);
        }
        if let Some(region) = &self.region {
            file.region = region.clone();
        }
        if self.no_provision {
            file.provision_buckets = false;
        }
        if let Some(log_dir) = &self.log_dir {
            file.log_dir = Some(log_dir.clone());
        }

        let debug = self.debug || std::env::var("DEBUG").is_ok_and(|v| parse_toggle(&v));
        file.into_config(debug)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    #[error("{0:#}")]
    Service(anyhow::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file = FileConfig::load(ctx.config_path.as_deref())?;
        let config = self.resolve(file);

        let _guard = logging::init(config.log_level, config.log_dir.as_deref())?;
        spawn_service(&config).await.map_err(DaemonError::Service)?;

        Ok("minfs plugin stopped".to_string())
    }
}
