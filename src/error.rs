//! Typed errors and HTTP mapping.

use crate::response::FailureAlert;
use crate::search::SearchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Contradictory or malformed identifiers; `error_key` is the machine-readable code (e.g. `idexists`).
    #[error("{message}")]
    BadRequestAlert {
        message: String,
        entity_name: &'static str,
        error_key: &'static str,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("search index: {0}")]
    Search(#[from] SearchError),
}

impl AppError {
    pub fn bad_request_alert(message: impl Into<String>, entity_name: &'static str, error_key: &'static str) -> Self {
        AppError::BadRequestAlert {
            message: message.into(),
            entity_name,
            error_key,
        }
    }

    /// Machine-readable error key, if this is a client-request alert.
    pub fn error_key(&self) -> Option<&'static str> {
        match self {
            AppError::BadRequestAlert { error_key, .. } => Some(*error_key),
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequestAlert { error_key, .. } => (StatusCode::BAD_REQUEST, *error_key),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::UnsupportedMediaType(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Search(_) => (StatusCode::INTERNAL_SERVER_ERROR, "search_error"),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let alert = match &self {
            AppError::BadRequestAlert { entity_name, error_key, .. } => Some(FailureAlert {
                entity_name: *entity_name,
                error_key: *error_key,
            }),
            _ => None,
        };
        let details = alert.as_ref().map(|a| {
            serde_json::json!({
                "entityName": a.entity_name,
                "errorKey": a.error_key,
            })
        });
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(alert) = alert {
            response.extensions_mut().insert(alert);
        }
        response
    }
}
