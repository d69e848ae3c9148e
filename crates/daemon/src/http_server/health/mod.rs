use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod liveness;
pub mod version;

pub use liveness::{LivezRequest, LivezResponse};
pub use version::VersionRequest;

pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/livez", get(liveness::handler))
        .route("/version", get(version::handler))
        .with_state(state)
}
