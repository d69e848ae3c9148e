//! Docker volume plugin endpoints
//!
//! Docker talks to the plugin with `POST` requests whose JSON bodies use
//! PascalCase field names. Every failure is answered with `{"Err": "..."}`
//! so the daemon can surface the message to the user.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::registry::RegistryError;
use crate::ServiceState;

pub mod activate;
pub mod capabilities;
pub mod create;
pub mod get;
pub mod list;
pub mod mount;
pub mod path;
pub mod remove;
pub mod unmount;

pub use activate::{ActivateRequest, ActivateResponse};
pub use capabilities::{Capabilities, CapabilitiesRequest, CapabilitiesResponse};
pub use create::{CreateRequest, CreateResponse};
pub use get::{GetRequest, GetResponse, Volume, VolumeStatus};
pub use list::{ListRequest, ListResponse};
pub use mount::{MountRequest, MountResponse};
pub use path::{PathRequest, PathResponse};
pub use remove::{RemoveRequest, RemoveResponse};
pub use unmount::{UnmountRequest, UnmountResponse};

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/Plugin.Activate", post(activate::handler))
        .route("/VolumeDriver.Create", post(create::handler))
        .route("/VolumeDriver.Remove", post(remove::handler))
        .route("/VolumeDriver.Mount", post(mount::handler))
        .route("/VolumeDriver.Unmount", post(unmount::handler))
        .route("/VolumeDriver.Path", post(path::handler))
        .route("/VolumeDriver.Get", post(get::handler))
        .route("/VolumeDriver.List", post(list::handler))
        .route("/VolumeDriver.Capabilities", post(capabilities::handler))
        .with_state(state)
}

/// Body of every failed plugin call, and the `Err` field of successful ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrResponse {
    #[serde(rename = "Err", default)]
    pub err: String,
}

/// Error returned by plugin handlers.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PluginError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PluginError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PluginError::Registry(err) => match err {
                RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
                RegistryError::Conflict { .. } | RegistryError::InUse { .. } => {
                    StatusCode::CONFLICT
                }
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::Provision { .. } => StatusCode::BAD_GATEWAY,
                RegistryError::Bind { .. }
                | RegistryError::Unbind { .. }
                | RegistryError::Filesystem { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for PluginError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "plugin request failed");
        } else {
            tracing::warn!(error = %self, "plugin request rejected");
        }
        (
            status,
            Json(ErrResponse {
                err: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// JSON body extractor for plugin requests.
///
/// Docker labels its bodies `application/vnd.docker.plugins.v1.x+json` and
/// older engines send no content type at all, so the header is not checked.
/// An empty body or `null` decodes as the type's default.
#[derive(Debug)]
pub struct PluginJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for PluginJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = PluginError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| PluginError::BadRequest(e.to_string()))?;
        decode_body(&bytes).map(PluginJson)
    }
}

fn decode_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, PluginError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    let value: Option<T> =
        serde_json::from_slice(bytes).map_err(|e| PluginError::BadRequest(e.to_string()))?;
    Ok(value.unwrap_or_default())
}
