use std::convert::Infallible;
use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use common::version::BuildInfo;
use minfs_daemon::http_server::health::{LivezRequest, LivezResponse, VersionRequest};
use minfs_daemon::http_server::plugin::CapabilitiesRequest;

/// Check that the plugin service is reachable
#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug)]
pub enum EndpointStatus {
    Ok(String),
    Unhealthy(String),
    NotReachable,
}

#[derive(Debug)]
pub struct HealthOutput {
    pub url: String,
    pub livez: EndpointStatus,
    pub version: Option<BuildInfo>,
    pub scope: EndpointStatus,
}

impl fmt::Display for HealthOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}):", "Plugin".bold(), self.url)?;

        let status_str = |s: &EndpointStatus| -> String {
            match s {
                EndpointStatus::Ok(detail) => format!("{} {}", "OK".green(), detail.dimmed()),
                EndpointStatus::Unhealthy(err) => format!("{} ({})", "UNHEALTHY".red(), err),
                EndpointStatus::NotReachable => "NOT REACHABLE".red().to_string(),
            }
        };

        writeln!(f, "  {} {}", "livez:".dimmed(), status_str(&self.livez))?;
        writeln!(f, "  {} {}", "scope:".dimmed(), status_str(&self.scope))?;
        match &self.version {
            Some(info) => write!(f, "  {} {}", "version:".dimmed(), info),
            None => write!(f, "  {} {}", "version:".dimmed(), "unknown".yellow()),
        }
    }
}

fn livez_detail(resp: &LivezResponse) -> String {
    match (resp.volumes, resp.mounted) {
        (Some(volumes), Some(mounted)) => {
            format!("{} ({volumes} volumes, {mounted} mounted)", resp.status)
        }
        _ => format!("{} (mount in progress)", resp.status),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = Infallible;
    type Output = HealthOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();

        let livez = match client.call(LivezRequest {}).await {
            Ok(resp) => EndpointStatus::Ok(livez_detail(&resp)),
            Err(e) if e.status().is_some() => EndpointStatus::Unhealthy(e.to_string()),
            Err(_) => EndpointStatus::NotReachable,
        };

        let scope = match client.call(CapabilitiesRequest {}).await {
            Ok(resp) => EndpointStatus::Ok(resp.capabilities.scope),
            Err(e) if e.status().is_some() => EndpointStatus::Unhealthy(e.to_string()),
            Err(_) => EndpointStatus::NotReachable,
        };

        let version = client.call(VersionRequest {}).await.ok();

        Ok(HealthOutput {
            url: client.base_url().to_string(),
            livez,
            version,
            scope,
        })
    }
}
