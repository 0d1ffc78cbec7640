//! The authenticated-caller extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user's id, set by the fronting
/// authentication layer.
pub const CALLER_HEADER: &str = "x-tally-caller";

/// The user on whose behalf the request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

impl Caller {
  /// Reject unless the caller is `user_id`.
  pub fn authorize(self, user_id: Uuid) -> Result<(), ApiError> {
    if self.0 == user_id {
      Ok(())
    } else {
      Err(ApiError::Forbidden(format!(
        "caller {} may not access user {user_id}",
        self.0
      )))
    }
  }
}

impl<S> FromRequestParts<S> for Caller
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(CALLER_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthenticated)?;

    Uuid::parse_str(raw.trim())
      .map(Caller)
      .map_err(|_| ApiError::Unauthenticated)
  }
}
