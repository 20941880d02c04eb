// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) and Protected (session cookie or bearer token required).
pub mod protected;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;

/// Path ids that are not UUIDs can never match a row, so they read as missing.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}

/// Unwraps a JSON body, turning malformed or non-JSON payloads into a 400.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::bad_request("Invalid JSON body"))
        }
    }
}
