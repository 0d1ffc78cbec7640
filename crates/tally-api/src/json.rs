//! A [`Json`] extractor whose rejection is an [`ApiError`], so malformed
//! bodies get the same `{"error": ..}` response as every other failure.

use axum::{
  Json,
  extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Drop-in for `axum::Json` in handler arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state).await?;
    Ok(Self(value))
  }
}
