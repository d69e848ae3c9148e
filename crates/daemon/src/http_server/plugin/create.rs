//! Create volume endpoint

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{ErrResponse, PluginError, PluginJson};
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

/// Request to create a named volume from volume options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Opts", default, skip_serializing_if = "Option::is_none")]
    pub opts: Option<HashMap<String, String>>,
}

pub type CreateResponse = ErrResponse;

#[tracing::instrument(skip_all, fields(volume = %req.name))]
pub async fn handler(
    State(state): State<ServiceState>,
    PluginJson(req): PluginJson<CreateRequest>,
) -> Result<Json<CreateResponse>, PluginError> {
    state.registry().create(&req.name, req.opts.as_ref()).await?;
    Ok(Json(CreateResponse::default()))
}

impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .post(route_url(base_url, "/VolumeDriver.Create"))
            .json(&self)
    }
}
