//! Driver capabilities endpoint

use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::{route_url, ApiRequest};

/// Volumes live on this host only.
pub const LOCAL_SCOPE: &str = "local";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilitiesRequest {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(rename = "Scope")]
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesResponse {
    #[serde(rename = "Capabilities")]
    pub capabilities: Capabilities,
}

pub async fn handler() -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        capabilities: Capabilities {
            scope: LOCAL_SCOPE.to_string(),
        },
    })
}

impl ApiRequest for CapabilitiesRequest {
    type Response = CapabilitiesResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(route_url(base_url, "/VolumeDriver.Capabilities"))
    }
}
