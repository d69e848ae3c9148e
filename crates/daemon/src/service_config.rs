//! Service configuration
//!
//! Values come from three layers, lowest precedence first: built-in defaults,
//! an optional TOML file, and command line flags / environment variables
//! (applied by the CLI on top of what [`FileConfig::load`] returns).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::BackendConfig;
use crate::provision::DEFAULT_REGION;

/// Where Docker looks for plugin sockets.
pub const DEFAULT_SOCKET_PATH: &str = "/run/docker/plugins/minfs.sock";
/// Default root under which volumes are mounted.
pub const DEFAULT_MOUNT_ROOT: &str = "/tmp";

/// Fully resolved configuration of a running plugin service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory under which every volume gets `<mount_root>/<name>`
    pub mount_root: PathBuf,
    /// Unix socket the plugin protocol is served on
    pub socket_path: PathBuf,
    /// Optional TCP address serving the same API, for administration
    pub api_listen_addr: Option<SocketAddr>,
    /// Region used when creating buckets
    pub region: String,
    /// Whether volume creation checks for and creates the remote bucket
    pub provision_buckets: bool,
    pub backend: BackendConfig,
    pub log_level: tracing::Level,
    /// When set, logs are also written to a daily rolling file here
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        FileConfig::default().into_config(false)
    }
}

/// Configuration as written in the TOML file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub mount_root: PathBuf,
    pub socket_path: PathBuf,
    pub api_listen_addr: Option<SocketAddr>,
    pub region: String,
    pub provision_buckets: bool,
    pub log_dir: Option<PathBuf>,
    pub backend: BackendConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            api_listen_addr: None,
            region: DEFAULT_REGION.to_string(),
            provision_buckets: true,
            log_dir: None,
            backend: BackendConfig::default(),
        }
    }
}

impl FileConfig {
    /// Load a config file. `None` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn into_config(self, debug: bool) -> Config {
        Config {
            mount_root: self.mount_root,
            socket_path: self.socket_path,
            api_listen_addr: self.api_listen_addr,
            region: self.region,
            provision_buckets: self.provision_buckets,
            backend: self.backend,
            log_level: log_level(debug),
            log_dir: self.log_dir,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Interpret a boolean toggle such as the `DEBUG` environment variable.
///
/// Accepts `1`, `t`, `true`, `y`, `yes`, `on` (any case) as true. Anything
/// else, including an empty value, is false.
pub fn parse_toggle(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "t" | "true" | "y" | "yes" | "on"
    )
}

pub fn log_level(debug: bool) -> tracing::Level {
    if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    }
}
