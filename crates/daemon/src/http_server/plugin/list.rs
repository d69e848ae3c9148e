//! List volumes endpoint

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::get::Volume;
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::ServiceState;

/// Docker sends no meaningful body for `List`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(rename = "Volumes", default)]
    pub volumes: Vec<Volume>,
    #[serde(rename = "Err", default)]
    pub err: String,
}

pub async fn handler(State(state): State<ServiceState>) -> Json<ListResponse> {
    let volumes = state
        .registry()
        .enumerate()
        .await
        .into_iter()
        .map(|(name, mountpoint)| Volume {
            name,
            mountpoint: mountpoint.display().to_string(),
            status: None,
        })
        .collect();

    Json(ListResponse {
        volumes,
        err: String::new(),
    })
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(route_url(base_url, "/VolumeDriver.List"))
    }
}
