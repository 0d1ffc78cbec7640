//! The day submission engine.
//!
//! [`submit_day`] validates a batch of entry values against the caller's
//! metrics, writes them, and recomputes the day's completion snapshot, all
//! against one [`DayTransaction`]. Every entry is validated before anything is
//! written, so a rejected batch never reaches the transaction at all; the
//! backend transaction covers storage failures part-way through the writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, ValidationError,
  day::{CheckinStatus, DayId, EntryInput},
  store::DayTransaction,
  validate::validate_entry,
};

/// A request to record one day's values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDay {
  /// The user whose day this is; must equal the authenticated caller.
  pub user_id: Uuid,
  pub day_id:  String,
  /// `"draft"` or `"submitted"`; anything else is rejected.
  pub status:  String,
  #[serde(default)]
  pub entries: Vec<EntryInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
  pub completion_pct: u8,
  pub saved_count:    usize,
}

/// `round(100 * answered / total)` with halves rounded up; 100 when nothing
/// is required.
pub fn completion_pct(answered: u32, total: u32) -> u8 {
  if total == 0 {
    return 100;
  }
  let answered = u64::from(answered.min(total));
  let total = u64::from(total);
  ((200 * answered + total) / (2 * total)) as u8
}

/// Validate, write, and snapshot one day's submission.
///
/// The caller owns the transaction: commit it on `Ok`, drop it on `Err`.
pub fn submit_day<T>(
  tx: &mut T,
  caller: Uuid,
  request: SubmitDay,
  now: DateTime<Utc>,
) -> Result<SubmitOutcome>
where
  T: DayTransaction,
{
  let user_id = request.user_id;
  if caller != user_id {
    return Err(Error::Unauthorized { caller, user_id });
  }

  let status = CheckinStatus::parse(&request.status)?;
  let day_id = DayId::parse(&request.day_id)?;

  tracing::debug!(
    %user_id,
    %day_id,
    %status,
    entries = request.entries.len(),
    "validating day submission"
  );

  let mut staged = Vec::with_capacity(request.entries.len());
  for input in &request.entries {
    let metric = tx
      .lookup_metric(user_id, input.metric_id)
      .map_err(Error::storage)?
      .ok_or(ValidationError::UnknownMetric(input.metric_id))?;
    let value = validate_entry(&metric, input)?;
    staged.push((metric.metric_id, value));
  }

  for (metric_id, value) in &staged {
    tx.upsert_entry(user_id, &day_id, *metric_id, value, now)
      .map_err(Error::storage)?;
  }

  let total = tx.count_active_required(user_id).map_err(Error::storage)?;
  let answered = tx
    .count_answered_required(user_id, &day_id)
    .map_err(Error::storage)?;
  let pct = completion_pct(answered, total);

  tx.upsert_checkin(user_id, &day_id, status, pct, now)
    .map_err(Error::storage)?;

  tracing::info!(
    %user_id,
    %day_id,
    %status,
    answered,
    total,
    completion_pct = pct,
    saved = staged.len(),
    "day submission applied"
  );

  Ok(SubmitOutcome { completion_pct: pct, saved_count: staged.len() })
}
