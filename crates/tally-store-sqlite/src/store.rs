//! [`SqliteStore`], the SQLite implementation of [`CheckinStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::{TransactionBehavior, params, types::Value};
use uuid::Uuid;

use tally_core::{
  day::{DayCheckin, DayEntry, DayId, DayRange, DayView},
  engine::{self, SubmitDay, SubmitOutcome},
  metric::{MetricDefinition, NewMetric},
  store::CheckinStore,
  validate::validate_new_metric,
};

use crate::{
  Error, Result,
  encode::{RawCheckin, RawEntry, RawMetric, encode_dt, encode_uuid},
  queries,
  schema::SCHEMA,
  tx::SqliteDayTx,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's own thread, so submissions for the same user and
/// day are applied one after another.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL on the connection thread.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Apply `update` to one metric row (scoped to its owner) and return the
  /// row as it stands afterwards.
  async fn update_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
    update: &'static str,
    value: Value,
  ) -> Result<Option<MetricDefinition>> {
    let user_str = encode_uuid(user_id);
    let metric_str = encode_uuid(metric_id);

    let raw: Option<RawMetric> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE metrics SET {update} WHERE user_id = ?1 AND metric_id = ?2"
        );
        conn.execute(&sql, params![user_str, metric_str, value])?;
        Ok(queries::select_metric(conn, &user_str, &metric_str, false)?)
      })
      .await?;

    raw.map(RawMetric::into_metric).transpose()
  }
}

// ─── CheckinStore impl ───────────────────────────────────────────────────────

impl CheckinStore for SqliteStore {
  type Error = Error;

  // ── Metric registry ───────────────────────────────────────────────────────

  async fn create_metric(&self, input: NewMetric) -> Result<MetricDefinition> {
    validate_new_metric(&input)?;

    let metric = MetricDefinition {
      metric_id:   Uuid::new_v4(),
      user_id:     input.user_id,
      name:        input.name.trim().to_owned(),
      kind:        input.kind,
      direction:   input.direction,
      required:    input.required,
      archived_at: None,
      // Stored at microsecond precision.
      created_at:  Utc::now().trunc_subsecs(6),
    };

    let metric_id_str = encode_uuid(metric.metric_id);
    let user_id_str   = encode_uuid(metric.user_id);
    let name          = metric.name.clone();
    let metric_type   = metric.kind.discriminant();
    let config_str    = metric.kind.config_json()?.to_string();
    let direction: &'static str = metric.direction.into();
    let required      = metric.required;
    let created_str   = encode_dt(metric.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO metrics (
             metric_id, user_id, name, metric_type, config_json,
             direction, required, archived_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)",
          params![
            metric_id_str,
            user_id_str,
            name,
            metric_type,
            config_str,
            direction,
            required,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(metric_id = %metric.metric_id, user_id = %metric.user_id, metric_type, "metric created");
    Ok(metric)
  }

  async fn get_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> Result<Option<MetricDefinition>> {
    let user_str = encode_uuid(user_id);
    let metric_str = encode_uuid(metric_id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(queries::select_metric(conn, &user_str, &metric_str, false)?)
      })
      .await?;

    raw.map(RawMetric::into_metric).transpose()
  }

  async fn list_metrics(
    &self,
    user_id: Uuid,
    include_archived: bool,
  ) -> Result<Vec<MetricDefinition>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawMetric> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM metrics
           WHERE user_id = ?1 AND (?2 = 1 OR archived_at IS NULL)
           ORDER BY created_at, rowid",
          RawMetric::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![user_str, include_archived], RawMetric::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMetric::into_metric).collect()
  }

  async fn archive_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> Result<Option<MetricDefinition>> {
    let now = encode_dt(Utc::now());
    self
      .update_metric(user_id, metric_id, "archived_at = COALESCE(archived_at, ?3)", Value::Text(now))
      .await
  }

  async fn restore_metric(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
  ) -> Result<Option<MetricDefinition>> {
    self
      .update_metric(user_id, metric_id, "archived_at = ?3", Value::Null)
      .await
  }

  async fn set_required(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
    required: bool,
  ) -> Result<Option<MetricDefinition>> {
    self
      .update_metric(user_id, metric_id, "required = ?3", Value::Integer(required.into()))
      .await
  }

  // ── Submission ────────────────────────────────────────────────────────────

  async fn submit_day(
    &self,
    caller: Uuid,
    request: SubmitDay,
  ) -> tally_core::Result<SubmitOutcome> {
    let now = Utc::now();

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = engine::submit_day(&mut SqliteDayTx::new(&tx), caller, request, now);
        // Dropping `tx` on the error path rolls everything back.
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await
      .map_err(|e| tally_core::Error::storage(Error::from(e)))?;

    if let Err(e) = &result {
      if e.is_rejection() {
        tracing::debug!(%caller, error = %e, "day submission rejected");
      } else {
        tracing::warn!(%caller, error = %e, "day submission rolled back");
      }
    }
    result
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_day(&self, user_id: Uuid, day_id: DayId) -> Result<DayView> {
    let user_str = encode_uuid(user_id);
    let day_str = day_id.to_string();

    let (checkin, entries): (Option<RawCheckin>, Vec<RawEntry>) = self
      .conn
      .call(move |conn| {
        let checkin = queries::select_checkin(conn, &user_str, &day_str)?;
        let entries = queries::select_day_entries(conn, &user_str, &day_str)?;
        Ok((checkin, entries))
      })
      .await?;

    Ok(DayView {
      day_id,
      checkin: checkin.map(RawCheckin::into_checkin).transpose()?,
      entries: entries
        .into_iter()
        .map(RawEntry::into_entry)
        .collect::<Result<_>>()?,
    })
  }

  async fn list_checkins(
    &self,
    user_id: Uuid,
    range: DayRange,
  ) -> Result<Vec<DayCheckin>> {
    let user_str = encode_uuid(user_id);
    let from = range.from.to_string();
    let to = range.to.to_string();

    let raws: Vec<RawCheckin> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM day_checkins
           WHERE user_id = ?1 AND day_id BETWEEN ?2 AND ?3
           ORDER BY day_id",
          RawCheckin::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![user_str, from, to], RawCheckin::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckin::into_checkin).collect()
  }

  async fn metric_series(
    &self,
    user_id: Uuid,
    metric_id: Uuid,
    range: DayRange,
  ) -> Result<Vec<DayEntry>> {
    let user_str = encode_uuid(user_id);
    let metric_str = encode_uuid(metric_id);
    let from = range.from.to_string();
    let to = range.to.to_string();

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM day_entries
           WHERE user_id = ?1 AND metric_id = ?2 AND day_id BETWEEN ?3 AND ?4
           ORDER BY day_id",
          RawEntry::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![user_str, metric_str, from, to], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}
