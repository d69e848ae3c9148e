//! Mount volume endpoint
//!
//! Called by Docker every time a container using the volume starts.

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{PluginError, PluginJson};
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRequest {
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Caller id. Docker sends one per container; the registry only counts
    /// references and does not track who holds them.
    #[serde(rename = "ID", default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountResponse {
    #[serde(rename = "Mountpoint")]
    pub mountpoint: String,
    #[serde(rename = "Err", default)]
    pub err: String,
}

#[tracing::instrument(skip_all, fields(volume = %req.name, id = %req.id))]
pub async fn handler(
    State(state): State<ServiceState>,
    PluginJson(req): PluginJson<MountRequest>,
) -> Result<Json<MountResponse>, PluginError> {
    let path = state.registry().attach(&req.name).await?;
    Ok(Json(MountResponse {
        mountpoint: path.display().to_string(),
        err: String::new(),
    }))
}

impl ApiRequest for MountRequest {
    type Response = MountResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .post(route_url(base_url, "/VolumeDriver.Mount"))
            .json(&self)
    }
}
