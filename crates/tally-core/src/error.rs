//! Error types for `tally-core`.
//!
//! [`Error`] is the taxonomy every operation surfaces: authorization and
//! validation failures are deterministic and carry a message meant for the
//! user; storage failures are opaque and safe to retry.

use thiserror::Error;
use uuid::Uuid;

use crate::metric::MetricType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("caller {caller} may not act on behalf of user {user_id}")]
  Unauthorized { caller: Uuid, user_id: Uuid },

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure.
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }

  /// `true` for failures caused by the request itself rather than the backend.
  pub fn is_rejection(&self) -> bool {
    matches!(self, Self::Unauthorized { .. } | Self::Validation(_))
  }
}

/// A rejected piece of input. The message names the offending metric and
/// value so it can be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
  #[error("invalid status {0:?}: expected \"draft\" or \"submitted\"")]
  InvalidStatus(String),

  #[error("invalid day id {0:?}: expected YYYY-MM-DD")]
  InvalidDayId(String),

  #[error("invalid day range: {from} is after {to}")]
  InvertedRange { from: String, to: String },

  #[error("metric {0} does not exist or is archived")]
  UnknownMetric(Uuid),

  #[error("metric {metric_id}: a {metric_type} metric needs `{field}`")]
  MissingValue {
    metric_id:   Uuid,
    metric_type: MetricType,
    field:       &'static str,
  },

  #[error("metric {metric_id}: `{field}` does not apply to a {metric_type} metric")]
  UnexpectedValue {
    metric_id:   Uuid,
    metric_type: MetricType,
    field:       &'static str,
  },

  #[error("metric {metric_id}: rating {value} is outside [{min}, {max}]")]
  RatingOutOfRange {
    metric_id: Uuid,
    value:     i64,
    min:       i32,
    max:       i32,
  },

  #[error(
    "metric {metric_id}: value {value} is outside {}",
    describe_bounds(*.min, *.max)
  )]
  NumberOutOfRange {
    metric_id: Uuid,
    value:     f64,
    min:       Option<f64>,
    max:       Option<f64>,
  },

  #[error("metric {metric_id}: value must be a finite number")]
  NonFiniteNumber { metric_id: Uuid },

  #[error("metric {metric_id}: {key:?} is not one of {allowed:?}")]
  UnknownOption {
    metric_id: Uuid,
    key:       String,
    allowed:   Vec<String>,
  },

  #[error("metric {metric_id}: at least one tag is required")]
  NoTags { metric_id: Uuid },

  #[error("metric {metric_id}: note must not be empty")]
  EmptyNote { metric_id: Uuid },

  #[error("metric {metric_id}: note is {len} characters long (max {max})")]
  NoteTooLong {
    metric_id: Uuid,
    len:       usize,
    max:       usize,
  },

  #[error("metric {metric_id} has an invalid config: {reason}")]
  MalformedMetric { metric_id: Uuid, reason: String },

  #[error("invalid metric config: {0}")]
  InvalidConfig(String),

  #[error("metric name must not be empty")]
  EmptyName,
}

fn describe_bounds(min: Option<f64>, max: Option<f64>) -> String {
  match (min, max) {
    (Some(min), Some(max)) => format!("[{min}, {max}]"),
    (Some(min), None) => format!("[{min}, ∞)"),
    (None, Some(max)) => format!("(-∞, {max}]"),
    (None, None) => "(-∞, ∞)".to_owned(),
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
