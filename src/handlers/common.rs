use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, AppResult};
use crate::models::PageRequest;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaginationParams {
    #[param(default = 1, minimum = 1)]
    pub page: Option<i64>,
    #[param(default = 10, minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

impl PaginationParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Reject a required text field whose length falls outside `min..=max` characters
pub fn validate_required(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Like `validate_required`, but an absent or empty value passes
pub fn validate_optional(
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> AppResult<()> {
    match value {
        Some(v) if !v.is_empty() => validate_required(field, v, min, max),
        _ => Ok(()),
    }
}
