//! Unmount volume endpoint

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{ErrResponse, PluginError, PluginJson};
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmountRequest {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ID", default)]
    pub id: String,
}

pub type UnmountResponse = ErrResponse;

#[tracing::instrument(skip_all, fields(volume = %req.name, id = %req.id))]
pub async fn handler(
    State(state): State<ServiceState>,
    PluginJson(req): PluginJson<UnmountRequest>,
) -> Result<Json<UnmountResponse>, PluginError> {
    state.registry().detach(&req.name).await?;
    Ok(Json(UnmountResponse::default()))
}

impl ApiRequest for UnmountRequest {
    type Response = UnmountResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .post(route_url(base_url, "/VolumeDriver.Unmount"))
            .json(&self)
    }
}
