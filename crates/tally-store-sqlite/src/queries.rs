//! Synchronous statements shared by the async store methods and the
//! submission transaction. All of them run on the connection thread.

use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::{EntrySlots, RawCheckin, RawEntry, RawMetric};

pub fn select_metric(
  conn: &Connection,
  user_id: &str,
  metric_id: &str,
  active_only: bool,
) -> rusqlite::Result<Option<RawMetric>> {
  let sql = format!(
    "SELECT {} FROM metrics
     WHERE user_id = ?1 AND metric_id = ?2
       AND (?3 = 0 OR archived_at IS NULL)",
    RawMetric::COLUMNS
  );
  conn
    .query_row(&sql, params![user_id, metric_id, active_only], RawMetric::from_row)
    .optional()
}

pub fn count_active_required(
  conn: &Connection,
  user_id: &str,
) -> rusqlite::Result<u32> {
  conn.query_row(
    "SELECT COUNT(*) FROM metrics
     WHERE user_id = ?1 AND required = 1 AND archived_at IS NULL",
    params![user_id],
    |r| r.get(0),
  )
}

pub fn count_answered_required(
  conn: &Connection,
  user_id: &str,
  day_id: &str,
) -> rusqlite::Result<u32> {
  conn.query_row(
    "SELECT COUNT(DISTINCT e.metric_id)
     FROM day_entries e
     JOIN metrics m ON m.metric_id = e.metric_id AND m.user_id = e.user_id
     WHERE e.user_id = ?1 AND e.day_id = ?2
       AND m.required = 1 AND m.archived_at IS NULL",
    params![user_id, day_id],
    |r| r.get(0),
  )
}

pub fn upsert_entry(
  conn: &Connection,
  user_id: &str,
  metric_id: &str,
  day_id: &str,
  slots: &EntrySlots,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO day_entries (
       user_id, metric_id, day_id,
       bool_value, int_value, float_value, text_value, select_key, tag_keys,
       created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
     ON CONFLICT (user_id, metric_id, day_id) DO UPDATE SET
       bool_value  = excluded.bool_value,
       int_value   = excluded.int_value,
       float_value = excluded.float_value,
       text_value  = excluded.text_value,
       select_key  = excluded.select_key,
       tag_keys    = excluded.tag_keys,
       updated_at  = excluded.updated_at",
    params![
      user_id,
      metric_id,
      day_id,
      slots.bool_value,
      slots.int_value,
      slots.float_value,
      slots.text_value,
      slots.select_key,
      slots.tag_keys,
      now,
    ],
  )?;
  Ok(())
}

pub fn upsert_checkin(
  conn: &Connection,
  user_id: &str,
  day_id: &str,
  status: &str,
  completion_pct: u8,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO day_checkins (
       user_id, day_id, status, completion_pct, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
     ON CONFLICT (user_id, day_id) DO UPDATE SET
       status         = excluded.status,
       completion_pct = excluded.completion_pct,
       updated_at     = excluded.updated_at",
    params![user_id, day_id, status, completion_pct, now],
  )?;
  Ok(())
}

pub fn select_checkin(
  conn: &Connection,
  user_id: &str,
  day_id: &str,
) -> rusqlite::Result<Option<RawCheckin>> {
  let sql = format!(
    "SELECT {} FROM day_checkins WHERE user_id = ?1 AND day_id = ?2",
    RawCheckin::COLUMNS
  );
  conn
    .query_row(&sql, params![user_id, day_id], RawCheckin::from_row)
    .optional()
}

pub fn select_day_entries(
  conn: &Connection,
  user_id: &str,
  day_id: &str,
) -> rusqlite::Result<Vec<RawEntry>> {
  let sql = format!(
    "SELECT {} FROM day_entries
     WHERE user_id = ?1 AND day_id = ?2
     ORDER BY created_at, metric_id",
    RawEntry::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  stmt
    .query_map(params![user_id, day_id], RawEntry::from_row)?
    .collect()
}
