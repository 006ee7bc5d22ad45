//! Field constraints for Point payloads.

use crate::domain::{Point, PointPatch, TITLE_MAX_LENGTH};
use crate::error::AppError;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full payload (create, update). All fields are required.
    pub fn validate(point: &Point) -> Result<(), AppError> {
        validate_required("title", &point.title)?;
        validate_max_length("title", &point.title, TITLE_MAX_LENGTH)?;
        validate_required("description", &point.description)?;
        Ok(())
    }

    /// Validate only the fields set in a patch. Null and absent fields are skipped.
    pub fn validate_partial(patch: &PointPatch) -> Result<(), AppError> {
        if let Some(title) = patch.title.as_set() {
            validate_required("title", title)?;
            validate_max_length("title", title, TITLE_MAX_LENGTH)?;
        }
        if let Some(description) = patch.description.as_set() {
            validate_required("description", description)?;
        }
        Ok(())
    }
}

fn validate_required(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_max_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
