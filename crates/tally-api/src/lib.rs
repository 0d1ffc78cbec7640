//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::CheckinStore`].
//! Authentication is the caller's responsibility: the fronting layer forwards
//! the signed-in user's id in the [`caller::CALLER_HEADER`] header, and every
//! route refuses to act on any other user's data.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```

pub mod caller;
pub mod days;
pub mod error;
pub mod json;
pub mod metrics;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use tally_core::store::CheckinStore;

pub use caller::Caller;
pub use error::ApiError;
pub use json::ApiJson;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CheckinStore + 'static,
{
  Router::new()
    // Metrics
    .route(
      "/users/{user_id}/metrics",
      get(metrics::list::<S>).post(metrics::create::<S>),
    )
    .route("/users/{user_id}/metrics/{metric_id}", get(metrics::get_one::<S>))
    .route(
      "/users/{user_id}/metrics/{metric_id}/archive",
      post(metrics::archive::<S>),
    )
    .route(
      "/users/{user_id}/metrics/{metric_id}/restore",
      post(metrics::restore::<S>),
    )
    .route(
      "/users/{user_id}/metrics/{metric_id}/required",
      put(metrics::set_required::<S>),
    )
    .route(
      "/users/{user_id}/metrics/{metric_id}/series",
      get(days::series::<S>),
    )
    // Days
    .route(
      "/users/{user_id}/days/{day_id}",
      get(days::get_one::<S>).post(days::submit::<S>),
    )
    .route("/users/{user_id}/checkins", get(days::checkins::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
