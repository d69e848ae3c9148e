//! Plugin handshake

use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::{route_url, ApiRequest};

/// Subsystem this plugin implements.
pub const VOLUME_DRIVER: &str = "VolumeDriver";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivateRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateResponse {
    #[serde(rename = "Implements")]
    pub implements: Vec<String>,
}

#[tracing::instrument]
pub async fn handler() -> Json<ActivateResponse> {
    tracing::info!("plugin activated");
    Json(ActivateResponse {
        implements: vec![VOLUME_DRIVER.to_string()],
    })
}

impl ApiRequest for ActivateRequest {
    type Response = ActivateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(route_url(base_url, "/Plugin.Activate"))
    }
}
