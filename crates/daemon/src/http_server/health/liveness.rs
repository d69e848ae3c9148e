use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivezRequest {}

/// Liveness of the plugin process.
///
/// The volume counts are left out while a mount or unmount holds the
/// registry, so a hung mount helper never stalls the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivezResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounted: Option<usize>,
}

impl ApiRequest for LivezRequest {
    type Response = LivezResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(route_url(base_url, "/_status/livez"))
    }
}

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let counts = state.registry().try_counts();
    if counts.is_none() {
        tracing::debug!("registry busy, reporting liveness without counts");
    }

    let response = LivezResponse {
        status: "ok".to_string(),
        volumes: counts.map(|c| c.volumes),
        mounted: counts.map(|c| c.mounted),
    };
    (StatusCode::OK, Json(response)).into_response()
}
