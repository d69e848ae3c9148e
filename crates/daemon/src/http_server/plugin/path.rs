//! Volume path endpoint

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{PluginError, PluginJson};
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRequest {
    #[serde(rename = "Name", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResponse {
    #[serde(rename = "Mountpoint")]
    pub mountpoint: String,
    #[serde(rename = "Err", default)]
    pub err: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginJson(req): PluginJson<PathRequest>,
) -> Result<Json<PathResponse>, PluginError> {
    let path = state.registry().lookup(&req.name).await?;
    Ok(Json(PathResponse {
        mountpoint: path.display().to_string(),
        err: String::new(),
    }))
}

impl ApiRequest for PathRequest {
    type Response = PathResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .post(route_url(base_url, "/VolumeDriver.Path"))
            .json(&self)
    }
}
