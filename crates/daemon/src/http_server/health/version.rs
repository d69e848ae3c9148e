use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::version::BuildInfo;

use crate::build_info;
use crate::http_server::api::client::{route_url, ApiRequest};

/// Request type for the version endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRequest {}

impl ApiRequest for VersionRequest {
    type Response = BuildInfo;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(route_url(base_url, "/_status/version"))
    }
}

/// Build of the running plugin. `build_features` lists `s3` when bucket
/// provisioning was compiled in.
#[tracing::instrument]
pub async fn handler() -> Response {
    (StatusCode::OK, Json(build_info())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_provisioning_support() {
        let response = handler().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let info: BuildInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            info.has_feature("s3"),
            cfg!(feature = "s3"),
            "build features: {}",
            info.build_features
        );
    }
}
