//! Request handlers, grouped by API area.

use std::collections::HashMap;

use crate::error::ApiError;

pub mod decisions;
pub mod milestones;
pub mod progress;
pub mod projects;
pub mod system;

/// Pull a required, non-empty query parameter.
pub(crate) fn require_param<'a>(
    params: &'a HashMap<String, String>,
    name: &str,
) -> Result<&'a str, ApiError> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("Missing '{name}' query parameter")))
}
