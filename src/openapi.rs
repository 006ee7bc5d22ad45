//! OpenAPI document for the point endpoints.

use crate::domain::{Point, PointPatch};
use crate::handlers::point;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        point::create_point,
        point::update_point,
        point::partial_update_point,
        point::list_points,
        point::get_point,
        point::delete_point,
        point::search_points,
    ),
    components(schemas(Point, PointPatch)),
    tags((name = "points", description = "Point management"))
)]
pub struct ApiDoc;
