//! Per-day records: the day identifier, submitted entry values, and the
//! check-in snapshot.

use std::{fmt, sync::LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::ValidationError;

// ─── DayId ───────────────────────────────────────────────────────────────────

// Shape only: `2025-02-30` and `2025-13-40` are accepted.
static DAY_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("day id pattern compiles")
});

/// An opaque calendar day (`YYYY-MM-DD`) in the user's reference timezone.
///
/// Only the textual shape is checked; the value is never interpreted as a
/// date. Because the format is fixed-width, lexical order is chronological.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct DayId(String);

impl DayId {
  pub fn parse(raw: &str) -> Result<Self, ValidationError> {
    if DAY_ID_PATTERN.is_match(raw) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(ValidationError::InvalidDayId(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for DayId {
  type Error = ValidationError;

  fn try_from(raw: String) -> Result<Self, Self::Error> { Self::parse(&raw) }
}

impl From<DayId> for String {
  fn from(day: DayId) -> Self { day.0 }
}

impl fmt::Display for DayId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// An inclusive range of days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRange {
  pub from: DayId,
  pub to:   DayId,
}

impl DayRange {
  pub fn parse(from: &str, to: &str) -> Result<Self, ValidationError> {
    let from = DayId::parse(from)?;
    let to = DayId::parse(to)?;
    if from > to {
      return Err(ValidationError::InvertedRange {
        from: from.into(),
        to:   to.into(),
      });
    }
    Ok(Self { from, to })
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a day's check-in stands. Each submission overwrites the previous
/// status; a draft after a submit moves the day back to draft.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckinStatus {
  Draft,
  Submitted,
}

impl CheckinStatus {
  /// Parse the exact literal `"draft"` or `"submitted"`.
  pub fn parse(raw: &str) -> Result<Self, ValidationError> {
    raw
      .parse()
      .map_err(|_| ValidationError::InvalidStatus(raw.to_owned()))
  }
}

// ─── Entry input ─────────────────────────────────────────────────────────────

/// One value in a submission, as received from the caller. Exactly the slot
/// matching the target metric's type must be populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
  pub metric_id:   Uuid,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bool_value:  Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub int_value:   Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub float_value: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text_value:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub select_key:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tag_keys:    Option<Vec<String>>,
}

impl EntryInput {
  pub fn boolean(metric_id: Uuid, value: bool) -> Self {
    Self { metric_id, bool_value: Some(value), ..Default::default() }
  }

  pub fn int(metric_id: Uuid, value: i64) -> Self {
    Self { metric_id, int_value: Some(value), ..Default::default() }
  }

  pub fn float(metric_id: Uuid, value: f64) -> Self {
    Self { metric_id, float_value: Some(value), ..Default::default() }
  }

  pub fn text(metric_id: Uuid, value: impl Into<String>) -> Self {
    Self { metric_id, text_value: Some(value.into()), ..Default::default() }
  }

  pub fn select(metric_id: Uuid, key: impl Into<String>) -> Self {
    Self { metric_id, select_key: Some(key.into()), ..Default::default() }
  }

  pub fn tags<I, K>(metric_id: Uuid, keys: I) -> Self
  where
    I: IntoIterator<Item = K>,
    K: Into<String>,
  {
    Self {
      metric_id,
      tag_keys: Some(keys.into_iter().map(Into::into).collect()),
      ..Default::default()
    }
  }

  /// Names of every populated value slot, in declaration order.
  pub fn populated_fields(&self) -> Vec<&'static str> {
    [
      ("boolValue", self.bool_value.is_some()),
      ("intValue", self.int_value.is_some()),
      ("floatValue", self.float_value.is_some()),
      ("textValue", self.text_value.is_some()),
      ("selectKey", self.select_key.is_some()),
      ("tagKeys", self.tag_keys.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect()
  }
}

// ─── Stored values ───────────────────────────────────────────────────────────

/// A value that has passed validation against its metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EntryValue {
  Boolean(bool),
  Rating(i64),
  Number(f64),
  Select(String),
  /// Sorted and de-duplicated.
  Tags(Vec<String>),
  Notes(String),
}

/// One stored value per (user, metric, day). Re-submission overwrites the
/// value and bumps `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
  pub user_id:    Uuid,
  pub metric_id:  Uuid,
  pub day_id:     DayId,
  pub value:      EntryValue,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The per-day status record.
///
/// `completion_pct` is a snapshot taken at the most recent submission; it is
/// not recomputed when metrics are later archived or toggled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCheckin {
  pub user_id:        Uuid,
  pub day_id:         DayId,
  pub status:         CheckinStatus,
  pub completion_pct: u8,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// Everything stored for one user and day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
  pub day_id:  DayId,
  pub checkin: Option<DayCheckin>,
  pub entries: Vec<DayEntry>,
}
