//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tally_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored row does not decode into a domain value.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

impl From<tally_core::ValidationError> for Error {
  fn from(err: tally_core::ValidationError) -> Self {
    Self::Core(err.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
