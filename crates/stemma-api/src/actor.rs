//! Actor attribution for mutating requests.
//!
//! The `X-Actor-Id` header names the actor recorded on created entities.
//! A missing header records an unknown actor rather than blocking the
//! operation; a malformed one is rejected so attribution is never
//! silently wrong.

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// Resolve the acting identity from the request headers.
pub fn actor_from_headers(
  headers: &HeaderMap,
) -> Result<Option<Uuid>, ApiError> {
  let Some(value) = headers.get(ACTOR_HEADER) else {
    return Ok(None);
  };
  let text = value
    .to_str()
    .map_err(|_| ApiError::BadRequest("malformed X-Actor-Id header".into()))?;
  Uuid::parse_str(text)
    .map(Some)
    .map_err(|_| ApiError::BadRequest(format!("invalid actor id: {text:?}")))
}
