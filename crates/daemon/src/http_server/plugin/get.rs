//! Get volume endpoint

use axum::extract::State;
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{PluginError, PluginJson};
use crate::http_server::api::client::{route_url, ApiRequest};
use crate::registry::MountInfo;
use crate::ServiceState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    #[serde(rename = "Name", default)]
    pub name: String,
}

/// A volume as Docker sees it. `Status` is only filled in by `Get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Mountpoint")]
    pub mountpoint: String,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VolumeStatus>,
}

/// Driver specific state reported to `docker volume inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStatus {
    pub endpoint: String,
    pub bucket: String,
    pub ref_count: usize,
    pub bound: bool,
}

impl From<MountInfo> for Volume {
    fn from(info: MountInfo) -> Self {
        Self {
            name: info.name,
            mountpoint: info.mountpoint.display().to_string(),
            status: Some(VolumeStatus {
                endpoint: info.endpoint,
                bucket: info.bucket,
                ref_count: info.ref_count,
                bound: info.bound,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(rename = "Volume")]
    pub volume: Volume,
    #[serde(rename = "Err", default)]
    pub err: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    PluginJson(req): PluginJson<GetRequest>,
) -> Result<Json<GetResponse>, PluginError> {
    let info = state.registry().inspect(&req.name).await?;
    Ok(Json(GetResponse {
        volume: info.into(),
        err: String::new(),
    }))
}

impl ApiRequest for GetRequest {
    type Response = GetResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client
            .post(route_url(base_url, "/VolumeDriver.Get"))
            .json(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_serializes_docker_field_names() {
        let volume = Volume::from(MountInfo {
            name: "data".into(),
            mountpoint: "/tmp/data".into(),
            endpoint: "http://minio:9000/".into(),
            bucket: "imgs".into(),
            ref_count: 1,
            bound: true,
        });

        let value = serde_json::to_value(&volume).unwrap();
        assert_eq!(value["Name"], "data");
        assert_eq!(value["Mountpoint"], "/tmp/data");
        assert_eq!(value["Status"]["ref_count"], 1);
        assert_eq!(value["Status"]["bound"], true);
        assert_eq!(value["Status"]["bucket"], "imgs");
    }
}
