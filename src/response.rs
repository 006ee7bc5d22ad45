//! Response helpers: entity alert headers and paginated bodies.

use crate::pagination::{link_header, Page, TOTAL_COUNT_HEADER};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Marker left on error responses for client-request failures; `failure_alert_headers` turns it into headers.
#[derive(Clone, Copy, Debug)]
pub struct FailureAlert {
    pub entity_name: &'static str,
    pub error_key: &'static str,
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) {
    match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::warn!(header = %name, "skipping invalid header"),
    }
}

fn alert(application_name: &str, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &format!("X-{}-alert", application_name), message);
    insert(&mut headers, &format!("X-{}-params", application_name), param);
    headers
}

pub fn entity_creation_alert(application_name: &str, entity_name: &str, param: &str) -> HeaderMap {
    alert(application_name, &format!("{}.{}.created", application_name, entity_name), param)
}

pub fn entity_update_alert(application_name: &str, entity_name: &str, param: &str) -> HeaderMap {
    alert(application_name, &format!("{}.{}.updated", application_name, entity_name), param)
}

pub fn entity_deletion_alert(application_name: &str, entity_name: &str, param: &str) -> HeaderMap {
    alert(application_name, &format!("{}.{}.deleted", application_name, entity_name), param)
}

pub fn failure_alert(application_name: &str, entity_name: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &format!("X-{}-error", application_name), &format!("error.{}", error_key));
    insert(&mut headers, &format!("X-{}-params", application_name), entity_name);
    headers
}

/// Layer function: add `X-{app}-error` headers to responses carrying a [`FailureAlert`].
pub async fn failure_alert_headers(State(state): State<AppState>, mut response: Response) -> Response {
    if let Some(alert) = response.extensions().get::<FailureAlert>().copied() {
        let headers = failure_alert(&state.settings.application_name, alert.entity_name, alert.error_key);
        response.headers_mut().extend(headers);
    }
    response
}

/// 200 with the page content as a JSON array, plus `X-Total-Count` and `Link`.
pub fn paginated<T: Serialize>(uri: &Uri, page: Page<T>) -> Response {
    let mut headers = HeaderMap::new();
    insert(&mut headers, TOTAL_COUNT_HEADER, &page.total.to_string());
    insert(&mut headers, "Link", &link_header(uri, &page));
    (StatusCode::OK, headers, Json(page.content)).into_response()
}
