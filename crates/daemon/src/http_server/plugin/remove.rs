//! Remove volume endpoint

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{ErrResponse, PluginError, PluginJson};
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRequest {
    #[serde(rename = "Name", default)]
    pub name: String,
}

pub type RemoveResponse = ErrResponse;

#[tracing::instrument(skip_all, fields(volume = %req.name))]
pub async fn handler(
    State(state): State<ServiceState>,
    PluginJson(req): PluginJson<RemoveRequest>,
) -> Result<Json<RemoveResponse>, PluginError> {
    state.registry().remove(&req.name).await?;
    Ok(Json(RemoveResponse::default()))
}

impl ApiRequest for RemoveRequest {
    type Response = RemoveResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .post(route_url(base_url, "/VolumeDriver.Remove"))
            .json(&self)
    }
}
