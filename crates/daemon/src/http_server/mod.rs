use axum::Router;
use tower_http::trace::TraceLayer;

use crate::ServiceState;

pub mod api;
pub mod health;
pub mod plugin;

/// Full router: the Docker plugin protocol plus the `/_status` probes.
pub fn router(state: ServiceState) -> Router {
    Router::new()
        .merge(plugin::router(state.clone()))
        .nest("/_status", health::router(state))
        .layer(TraceLayer::new_for_http())
}
