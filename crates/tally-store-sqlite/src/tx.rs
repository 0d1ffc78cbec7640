//! [`SqliteDayTx`] is the [`DayTransaction`] view over an open rusqlite
//! transaction.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tally_core::{
  day::{CheckinStatus, DayId, EntryValue},
  metric::MetricDefinition,
  store::DayTransaction,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{EntrySlots, RawMetric, encode_dt, encode_uuid},
  queries,
};

/// Borrows the connection of a live `rusqlite::Transaction`; committing or
/// rolling back stays with the owner of the transaction.
pub struct SqliteDayTx<'a> {
  conn: &'a Connection,
}

impl<'a> SqliteDayTx<'a> {
  pub fn new(conn: &'a Connection) -> Self { Self { conn } }
}

impl DayTransaction for SqliteDayTx<'_> {
  type Error = Error;

  fn lookup_metric(
    &mut self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> Result<Option<MetricDefinition>> {
    queries::select_metric(
      self.conn,
      &encode_uuid(user_id),
      &encode_uuid(metric_id),
      true,
    )?
    .map(RawMetric::into_metric)
    .transpose()
  }

  fn upsert_entry(
    &mut self,
    user_id: Uuid,
    day_id: &DayId,
    metric_id: Uuid,
    value: &EntryValue,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let slots = EntrySlots::encode(value)?;
    queries::upsert_entry(
      self.conn,
      &encode_uuid(user_id),
      &encode_uuid(metric_id),
      day_id.as_str(),
      &slots,
      &encode_dt(now),
    )?;
    Ok(())
  }

  fn count_active_required(&mut self, user_id: Uuid) -> Result<u32> {
    Ok(queries::count_active_required(self.conn, &encode_uuid(user_id))?)
  }

  fn count_answered_required(
    &mut self,
    user_id: Uuid,
    day_id: &DayId,
  ) -> Result<u32> {
    Ok(queries::count_answered_required(
      self.conn,
      &encode_uuid(user_id),
      day_id.as_str(),
    )?)
  }

  fn upsert_checkin(
    &mut self,
    user_id: Uuid,
    day_id: &DayId,
    status: CheckinStatus,
    completion_pct: u8,
    now: DateTime<Utc>,
  ) -> Result<()> {
    queries::upsert_checkin(
      self.conn,
      &encode_uuid(user_id),
      day_id.as_str(),
      status.into(),
      completion_pct,
      &encode_dt(now),
    )?;
    Ok(())
  }
}
