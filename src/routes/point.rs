//! Point CRUD and search routes, relative to the API prefix.

use crate::handlers::point::{
    create_point, delete_point, get_point, list_points, partial_update_point, search_points, update_point,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn point_routes(state: AppState) -> Router {
    Router::new()
        .route("/points", get(list_points).post(create_point))
        .route(
            "/points/:id",
            get(get_point)
                .put(update_point)
                .patch(partial_update_point)
                .delete(delete_point),
        )
        .route("/_search/points", get(search_points))
        .with_state(state)
}
