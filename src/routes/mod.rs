//! Router assembly.

mod common;
mod point;

pub use common::{common_routes, common_routes_with_ready};
pub use point::point_routes;

use crate::response::failure_alert_headers;
use crate::state::AppState;
use axum::{middleware::map_response_with_state, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application: operational routes at the root, point routes under the configured API prefix.
pub fn app(state: AppState) -> Router {
    let api = point_routes(state.clone());
    let prefix = state.settings.api_prefix.clone();
    let api = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(api)
        .layer(map_response_with_state(state.clone(), failure_alert_headers))
        .layer(RequestBodyLimitLayer::new(state.settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
