//! Storage traits.
//!
//! [`CheckinStore`] is the async surface that higher layers (`tally-api`,
//! `tally-server`) depend on. [`DayTransaction`] is the narrow, synchronous
//! view of one open storage transaction that [`crate::engine::submit_day`]
//! runs against; backends implement it over their native transaction so the
//! entry writes and the check-in snapshot commit or roll back together.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  day::{CheckinStatus, DayCheckin, DayEntry, DayId, DayRange, DayView, EntryValue},
  engine::{SubmitDay, SubmitOutcome},
  metric::{MetricDefinition, NewMetric},
};

// ─── Transaction view ────────────────────────────────────────────────────────

/// One open, not-yet-committed unit of work scoped to a single backend
/// transaction. Dropping it without committing must discard every write.
pub trait DayTransaction {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve an active metric owned by `user_id`. Returns `None` when the
  /// metric does not exist, belongs to another user, or is archived.
  fn lookup_metric(
    &mut self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> Result<Option<MetricDefinition>, Self::Error>;

  /// Insert or overwrite the value for `(user_id, metric_id, day_id)`.
  fn upsert_entry(
    &mut self,
    user_id: Uuid,
    day_id: &DayId,
    metric_id: Uuid,
    value: &EntryValue,
    now: DateTime<Utc>,
  ) -> Result<(), Self::Error>;

  /// Number of active, required metrics the user has.
  fn count_active_required(&mut self, user_id: Uuid) -> Result<u32, Self::Error>;

  /// Number of distinct active, required metrics with any stored entry for
  /// the day, regardless of which submission wrote it.
  fn count_answered_required(
    &mut self,
    user_id: Uuid,
    day_id: &DayId,
  ) -> Result<u32, Self::Error>;

  /// Insert or overwrite the day's status and completion snapshot.
  fn upsert_checkin(
    &mut self,
    user_id: Uuid,
    day_id: &DayId,
    status: CheckinStatus,
    completion_pct: u8,
    now: DateTime<Utc>,
  ) -> Result<(), Self::Error>;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Abstraction over a Tally storage backend.
///
/// Every read and write is scoped to one user; another user's metric is
/// indistinguishable from a missing one.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CheckinStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Metric registry ───────────────────────────────────────────────────

  /// Validate and persist a new metric.
  fn create_metric(
    &self,
    input: NewMetric,
  ) -> impl Future<Output = Result<MetricDefinition, Self::Error>> + Send + '_;

  /// Fetch a metric, archived or not.
  fn get_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> impl Future<Output = Result<Option<MetricDefinition>, Self::Error>> + Send + '_;

  /// All of a user's metrics in creation order.
  fn list_metrics(
    &self,
    user_id: Uuid,
    include_archived: bool,
  ) -> impl Future<Output = Result<Vec<MetricDefinition>, Self::Error>> + Send + '_;

  /// Soft-delete a metric. Archiving twice keeps the first timestamp.
  fn archive_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> impl Future<Output = Result<Option<MetricDefinition>, Self::Error>> + Send + '_;

  /// Undo [`CheckinStore::archive_metric`].
  fn restore_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> impl Future<Output = Result<Option<MetricDefinition>, Self::Error>> + Send + '_;

  fn set_required(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
    required: bool,
  ) -> impl Future<Output = Result<Option<MetricDefinition>, Self::Error>> + Send + '_;

  // ── Submission ────────────────────────────────────────────────────────

  /// Run [`crate::engine::submit_day`] inside a single backend transaction.
  /// Any error leaves storage untouched.
  fn submit_day(
    &self,
    caller: Uuid,
    request: SubmitDay,
  ) -> impl Future<Output = crate::Result<SubmitOutcome>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The stored check-in and entries for a day, exactly as last committed.
  fn get_day(
    &self,
    user_id: Uuid,
    day_id: DayId,
  ) -> impl Future<Output = Result<DayView, Self::Error>> + Send + '_;

  /// Check-ins within `range`, oldest first.
  fn list_checkins(
    &self,
    user_id: Uuid,
    range: DayRange,
  ) -> impl Future<Output = Result<Vec<DayCheckin>, Self::Error>> + Send + '_;

  /// One metric's entries within `range`, oldest first.
  fn metric_series(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
    range: DayRange,
  ) -> impl Future<Output = Result<Vec<DayEntry>, Self::Error>> + Send + '_;
}
