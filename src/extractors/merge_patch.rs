//! Extract a JSON merge-patch body (`application/merge-patch+json`).

use super::json::json_rejection;
use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;

pub const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Like `Json<T>`, but only accepts the merge-patch content type; anything else is a 415.
#[derive(Clone, Debug)]
pub struct MergePatch<T>(pub T);

fn is_merge_patch(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(MERGE_PATCH_CONTENT_TYPE))
        .unwrap_or(false)
}

#[async_trait]
impl<T, S> FromRequest<S> for MergePatch<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_merge_patch(&content_type) {
            return Err(AppError::UnsupportedMediaType(format!(
                "expected {}, got '{}'",
                MERGE_PATCH_CONTENT_TYPE, content_type
            )));
        }
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;
        Ok(MergePatch(value))
    }
}
