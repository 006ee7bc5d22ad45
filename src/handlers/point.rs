//! REST handlers for points: create, update, patch, list, read, delete, search.

use crate::domain::{Point, PointPatch, ENTITY_NAME};
use crate::error::AppError;
use crate::extractors::{JsonBody, MergePatch};
use crate::pagination::PageRequest;
use crate::response::{entity_creation_alert, entity_deletion_alert, entity_update_alert, paginated};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// The three identifier checks shared by update and patch, in order: idnull, idinvalid, idnotfound.
async fn check_target_id(state: &AppState, path_id: i64, body_id: Option<i64>) -> Result<(), AppError> {
    let Some(body_id) = body_id else {
        return Err(AppError::bad_request_alert("Invalid id", ENTITY_NAME, "idnull"));
    };
    if body_id != path_id {
        return Err(AppError::bad_request_alert("Invalid ID", ENTITY_NAME, "idinvalid"));
    }
    if !state.points.exists(path_id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }
    Ok(())
}

fn stored_id(point: &Point) -> String {
    point.id.map(|id| id.to_string()).unwrap_or_default()
}

#[utoipa::path(
    post,
    path = "/api/points",
    request_body = Point,
    responses(
        (status = 201, description = "Point created", body = Point),
        (status = 400, description = "idexists, or a field constraint failed"),
    ),
    tag = "points"
)]
pub async fn create_point(State(state): State<AppState>, JsonBody(point): JsonBody<Point>) -> Result<Response, AppError> {
    tracing::debug!(?point, "REST request to save Point");
    RequestValidator::validate(&point)?;
    if point.id.is_some() {
        return Err(AppError::bad_request_alert(
            "A new point cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }
    let result = state.points.persist_and_index(&point).await?;
    let id = stored_id(&result);
    let location = format!("{}/points/{}", state.settings.api_prefix, id);
    let mut headers = entity_creation_alert(&state.settings.application_name, ENTITY_NAME, &id);
    if let Ok(value) = HeaderValue::try_from(location) {
        headers.insert(LOCATION, value);
    }
    Ok((StatusCode::CREATED, headers, Json(result)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/points/{id}",
    params(("id" = i64, Path, description = "Id of the point to replace")),
    request_body = Point,
    responses(
        (status = 200, description = "Point replaced", body = Point),
        (status = 400, description = "idnull, idinvalid, idnotfound, or a field constraint failed"),
    ),
    tag = "points"
)]
pub async fn update_point(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(point): JsonBody<Point>,
) -> Result<Response, AppError> {
    tracing::debug!(id, ?point, "REST request to update Point");
    RequestValidator::validate(&point)?;
    check_target_id(&state, id, point.id).await?;
    let result = state.points.persist_and_index(&point).await?;
    let headers = entity_update_alert(&state.settings.application_name, ENTITY_NAME, &id.to_string());
    Ok((StatusCode::OK, headers, Json(result)).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/points/{id}",
    params(("id" = i64, Path, description = "Id of the point to patch")),
    request_body(content = PointPatch, content_type = "application/merge-patch+json"),
    responses(
        (status = 200, description = "Point merged", body = Point),
        (status = 400, description = "idnull, idinvalid, idnotfound, or a field constraint failed"),
        (status = 404, description = "Point disappeared before it could be merged"),
        (status = 415, description = "Body is not application/merge-patch+json"),
    ),
    tag = "points"
)]
pub async fn partial_update_point(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MergePatch(patch): MergePatch<PointPatch>,
) -> Result<Response, AppError> {
    tracing::debug!(id, ?patch, "REST request to partial update Point");
    check_target_id(&state, id, patch.id).await?;
    RequestValidator::validate_partial(&patch)?;
    let result = state
        .points
        .partial_update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("point {}", id)))?;
    let headers = entity_update_alert(&state.settings.application_name, ENTITY_NAME, &id.to_string());
    Ok((StatusCode::OK, headers, Json(result)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/points",
    params(
        ("page" = Option<u32>, Query, description = "Zero-based page number"),
        ("size" = Option<u32>, Query, description = "Page size"),
        ("sort" = Option<String>, Query, description = "property[,asc|desc], repeatable"),
    ),
    responses((status = 200, description = "One page of points; X-Total-Count and Link headers", body = [Point])),
    tag = "points"
)]
pub async fn list_points(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    tracing::debug!("REST request to get a page of Points");
    let request = PageRequest::from_query(&params)?;
    let page = state.points.find_page(&request).await?;
    Ok(paginated(&uri, page))
}

#[utoipa::path(
    get,
    path = "/api/points/{id}",
    params(("id" = i64, Path, description = "Id of the point")),
    responses(
        (status = 200, description = "The point", body = Point),
        (status = 404, description = "No such point"),
    ),
    tag = "points"
)]
pub async fn get_point(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Point>, AppError> {
    tracing::debug!(id, "REST request to get Point");
    let point = state
        .points
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("point {}", id)))?;
    Ok(Json(point))
}

#[utoipa::path(
    delete,
    path = "/api/points/{id}",
    params(("id" = i64, Path, description = "Id of the point")),
    responses((status = 204, description = "Deleted, or was already absent")),
    tag = "points"
)]
pub async fn delete_point(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, AppError> {
    tracing::debug!(id, "REST request to delete Point");
    state.points.delete(id).await?;
    let headers = entity_deletion_alert(&state.settings.application_name, ENTITY_NAME, &id.to_string());
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}

#[utoipa::path(
    get,
    path = "/api/_search/points",
    params(
        ("query" = String, Query, description = "Query in the search index's query-string grammar"),
        ("page" = Option<u32>, Query, description = "Zero-based page number"),
        ("size" = Option<u32>, Query, description = "Page size"),
        ("sort" = Option<String>, Query, description = "property[,asc|desc], repeatable"),
    ),
    responses(
        (status = 200, description = "One page of matches; X-Total-Count and Link headers", body = [Point]),
        (status = 400, description = "Missing query"),
    ),
    tag = "points"
)]
pub async fn search_points(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let query = params
        .iter()
        .find(|(k, _)| k == "query")
        .map(|(_, v)| v.clone())
        .ok_or_else(|| AppError::BadRequest("query parameter is required".into()))?;
    tracing::debug!(%query, "REST request to search for a page of Points");
    let request = PageRequest::from_query(&params)?;
    let page = state.points.search(&query, &request).await?;
    Ok(paginated(&uri, page))
}
