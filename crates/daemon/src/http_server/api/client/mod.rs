//! Typed client for the plugin API
//!
//! Every request type under [`crate::http_server`] implements [`ApiRequest`],
//! so the CLI and tests share the exact wire types the handlers use.

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

#[allow(clippy::module_inception)]
mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}

/// `base_url` with its path replaced by `path`.
pub fn route_url(base_url: &Url, path: &str) -> Url {
    let mut url = base_url.clone();
    url.set_path(path);
    url.set_query(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_replaces_path() {
        let base = Url::parse("http://127.0.0.1:9180/ignored?x=1").unwrap();
        assert_eq!(
            route_url(&base, "/VolumeDriver.Create").as_str(),
            "http://127.0.0.1:9180/VolumeDriver.Create"
        );
    }
}
