//! Build information
//!
//! The build script of each crate stamps `BUILD_TIMESTAMP`, `BUILD_PROFILE`
//! and (for the daemon) `BUILD_FEATURES` into the compile environment. Use the
//! [`build_info!`](crate::build_info) macro so the values are read from the
//! calling crate rather than from this one.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub build_profile: String,
    pub build_timestamp: String,
    /// Comma separated list of cargo features, or `none`.
    pub build_features: String,
}

impl BuildInfo {
    /// Build info of this crate.
    pub fn new() -> Self {
        Self::from_parts(
            env!("CARGO_PKG_VERSION"),
            option_env!("BUILD_PROFILE"),
            option_env!("BUILD_TIMESTAMP"),
            option_env!("BUILD_FEATURES"),
        )
    }

    pub fn from_parts(
        version: &str,
        build_profile: Option<&str>,
        build_timestamp: Option<&str>,
        build_features: Option<&str>,
    ) -> Self {
        Self {
            version: version.to_string(),
            build_profile: build_profile.unwrap_or("unknown").to_string(),
            build_timestamp: build_timestamp.unwrap_or("unknown").to_string(),
            build_features: build_features
                .filter(|f| !f.is_empty())
                .unwrap_or("none")
                .to_string(),
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.build_features.split(',').any(|f| f.trim() == feature)
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, built {}, features: {})",
            self.version, self.build_profile, self.build_timestamp, self.build_features
        )
    }
}

/// Build info of the crate invoking the macro.
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo::from_parts(
            env!("CARGO_PKG_VERSION"),
            option_env!("BUILD_PROFILE"),
            option_env!("BUILD_TIMESTAMP"),
            option_env!("BUILD_FEATURES"),
        )
    };
}
