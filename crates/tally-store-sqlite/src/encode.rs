//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 strings (microseconds,
//! `Z` suffix), so lexical order is chronological. Metric configs and tag
//! sets are stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tally_core::{
  day::{CheckinStatus, DayCheckin, DayEntry, DayId, EntryValue},
  metric::{Direction, MetricDefinition, MetricKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── String-form enums ───────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Corrupt(format!("unknown {what}: {s:?}")))
}

pub fn decode_direction(s: &str) -> Result<Direction> {
  decode_enum("direction", s)
}

pub fn decode_status(s: &str) -> Result<CheckinStatus> {
  decode_enum("check-in status", s)
}

pub fn decode_day_id(s: &str) -> Result<DayId> {
  DayId::parse(s).map_err(|e| Error::Corrupt(e.to_string()))
}

// ─── Entry value slots ───────────────────────────────────────────────────────

/// The six typed columns of a `day_entries` row.
#[derive(Debug, Default)]
pub struct EntrySlots {
  pub bool_value:  Option<bool>,
  pub int_value:   Option<i64>,
  pub float_value: Option<f64>,
  pub text_value:  Option<String>,
  pub select_key:  Option<String>,
  /// JSON-encoded array.
  pub tag_keys:    Option<String>,
}

impl EntrySlots {
  pub fn encode(value: &EntryValue) -> Result<Self> {
    let mut slots = Self::default();
    match value {
      EntryValue::Boolean(v) => slots.bool_value = Some(*v),
      EntryValue::Rating(v) => slots.int_value = Some(*v),
      EntryValue::Number(v) => slots.float_value = Some(*v),
      EntryValue::Select(k) => slots.select_key = Some(k.clone()),
      EntryValue::Tags(keys) => slots.tag_keys = Some(serde_json::to_string(keys)?),
      EntryValue::Notes(t) => slots.text_value = Some(t.clone()),
    }
    Ok(slots)
  }

  pub fn decode(self) -> Result<EntryValue> {
    match self {
      Self { bool_value: Some(v), int_value: None, float_value: None, text_value: None, select_key: None, tag_keys: None } => {
        Ok(EntryValue::Boolean(v))
      }
      Self { bool_value: None, int_value: Some(v), float_value: None, text_value: None, select_key: None, tag_keys: None } => {
        Ok(EntryValue::Rating(v))
      }
      Self { bool_value: None, int_value: None, float_value: Some(v), text_value: None, select_key: None, tag_keys: None } => {
        Ok(EntryValue::Number(v))
      }
      Self { bool_value: None, int_value: None, float_value: None, text_value: Some(t), select_key: None, tag_keys: None } => {
        Ok(EntryValue::Notes(t))
      }
      Self { bool_value: None, int_value: None, float_value: None, text_value: None, select_key: Some(k), tag_keys: None } => {
        Ok(EntryValue::Select(k))
      }
      Self { bool_value: None, int_value: None, float_value: None, text_value: None, select_key: None, tag_keys: Some(json) } => {
        Ok(EntryValue::Tags(serde_json::from_str(&json)?))
      }
      other => Err(Error::Corrupt(format!(
        "entry row must populate exactly one value column: {other:?}"
      ))),
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `metrics` row.
pub struct RawMetric {
  pub metric_id:   String,
  pub user_id:     String,
  pub name:        String,
  pub metric_type: String,
  pub config_json: String,
  pub direction:   String,
  pub required:    bool,
  pub archived_at: Option<String>,
  pub created_at:  String,
}

impl RawMetric {
  /// Column list matching [`RawMetric::from_row`].
  pub const COLUMNS: &'static str = "metric_id, user_id, name, metric_type, \
     config_json, direction, required, archived_at, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      metric_id:   row.get(0)?,
      user_id:     row.get(1)?,
      name:        row.get(2)?,
      metric_type: row.get(3)?,
      config_json: row.get(4)?,
      direction:   row.get(5)?,
      required:    row.get(6)?,
      archived_at: row.get(7)?,
      created_at:  row.get(8)?,
    })
  }

  pub fn into_metric(self) -> Result<MetricDefinition> {
    let config: serde_json::Value = serde_json::from_str(&self.config_json)?;
    let kind = MetricKind::from_parts(&self.metric_type, config)?;

    Ok(MetricDefinition {
      metric_id: decode_uuid(&self.metric_id)?,
      user_id: decode_uuid(&self.user_id)?,
      name: self.name,
      kind,
      direction: decode_direction(&self.direction)?,
      required: self.required,
      archived_at: self.archived_at.as_deref().map(decode_dt).transpose()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `day_entries` row.
pub struct RawEntry {
  pub user_id:    String,
  pub metric_id:  String,
  pub day_id:     String,
  pub slots:      EntrySlots,
  pub created_at: String,
  pub updated_at: String,
}

impl RawEntry {
  pub const COLUMNS: &'static str = "user_id, metric_id, day_id, bool_value, \
     int_value, float_value, text_value, select_key, tag_keys, created_at, \
     updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      metric_id:  row.get(1)?,
      day_id:     row.get(2)?,
      slots:      EntrySlots {
        bool_value:  row.get(3)?,
        int_value:   row.get(4)?,
        float_value: row.get(5)?,
        text_value:  row.get(6)?,
        select_key:  row.get(7)?,
        tag_keys:    row.get(8)?,
      },
      created_at: row.get(9)?,
      updated_at: row.get(10)?,
    })
  }

  pub fn into_entry(self) -> Result<DayEntry> {
    Ok(DayEntry {
      user_id:    decode_uuid(&self.user_id)?,
      metric_id:  decode_uuid(&self.metric_id)?,
      day_id:     decode_day_id(&self.day_id)?,
      value:      self.slots.decode()?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `day_checkins` row.
pub struct RawCheckin {
  pub user_id:        String,
  pub day_id:         String,
  pub status:         String,
  pub completion_pct: u8,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawCheckin {
  pub const COLUMNS: &'static str =
    "user_id, day_id, status, completion_pct, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:        row.get(0)?,
      day_id:         row.get(1)?,
      status:         row.get(2)?,
      completion_pct: row.get(3)?,
      created_at:     row.get(4)?,
      updated_at:     row.get(5)?,
    })
  }

  pub fn into_checkin(self) -> Result<DayCheckin> {
    Ok(DayCheckin {
      user_id:        decode_uuid(&self.user_id)?,
      day_id:         decode_day_id(&self.day_id)?,
      status:         decode_status(&self.status)?,
      completion_pct: self.completion_pct,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slots_hold_exactly_one_value() {
    let value = EntryValue::Tags(vec!["happy".into(), "sad".into()]);
    let slots = EntrySlots::encode(&value).unwrap();
    assert_eq!(slots.tag_keys.as_deref(), Some(r#"["happy","sad"]"#));
    assert!(slots.bool_value.is_none() && slots.text_value.is_none());
    assert_eq!(slots.decode().unwrap(), value);
  }

  #[test]
  fn ambiguous_slots_are_corrupt() {
    let slots = EntrySlots {
      bool_value: Some(true),
      int_value: Some(3),
      ..Default::default()
    };
    assert!(matches!(slots.decode(), Err(Error::Corrupt(_))));
    assert!(matches!(EntrySlots::default().decode(), Err(Error::Corrupt(_))));
  }

  #[test]
  fn timestamps_sort_lexically() {
    let whole = DateTime::parse_from_rfc3339("2025-06-01T08:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let later = whole + chrono::Duration::milliseconds(1);
    let (a, b) = (encode_dt(whole), encode_dt(later));
    assert_eq!(a, "2025-06-01T08:00:00.000000Z");
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn unknown_enum_strings_are_corrupt() {
    assert!(matches!(decode_status("final"), Err(Error::Corrupt(_))));
    assert_eq!(decode_direction("negative").unwrap(), Direction::Negative);
  }
}
