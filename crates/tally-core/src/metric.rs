//! Metric definitions: the per-user schema that entries are validated
//! against.
//!
//! A metric is never hard-deleted while entries reference it; it is archived
//! instead, which removes it from lookups and completion counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::Result;

// ─── Discriminants ───────────────────────────────────────────────────────────

/// The value type a metric records. The string form is the `metric_type`
/// discriminant stored in the database.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricType {
  Boolean,
  Rating,
  Number,
  Select,
  Tags,
  Notes,
}

impl MetricType {
  /// The entry field that carries a value for this type.
  pub fn value_field(self) -> &'static str {
    match self {
      Self::Boolean => "boolValue",
      Self::Rating => "intValue",
      Self::Number => "floatValue",
      Self::Select => "selectKey",
      Self::Tags => "tagKeys",
      Self::Notes => "textValue",
    }
  }
}

/// Whether a higher value is good or bad. Purely presentational.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
  #[default]
  Positive,
  Negative,
}

// ─── Config payloads ─────────────────────────────────────────────────────────

/// Config for types that take no options (`boolean`, `notes`); always `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyConfig {}

/// An integer scale, inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingConfig {
  pub scale_min: i32,
  pub scale_max: i32,
  /// Optional display labels, one per scale step starting at `scale_min`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub labels:    Option<Vec<String>>,
}

/// A free numeric value with optional inclusive bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unit: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min:  Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max:  Option<f64>,
}

/// One selectable option; `key` is what entries store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
  pub key:   String,
  pub label: String,
}

impl ChoiceOption {
  pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
    Self { key: key.into(), label: label.into() }
  }
}

/// Shared by `select` (pick one) and `tags` (pick one or more).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceConfig {
  pub options: Vec<ChoiceOption>,
}

impl ChoiceConfig {
  pub fn has_key(&self, key: &str) -> bool {
    self.options.iter().any(|o| o.key == key)
  }

  pub fn keys(&self) -> Vec<String> {
    self.options.iter().map(|o| o.key.clone()).collect()
  }
}

// ─── MetricKind ──────────────────────────────────────────────────────────────

/// A metric's type together with its type-specific config. The pairing makes
/// a config of the wrong shape unrepresentable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum MetricKind {
  Boolean(EmptyConfig),
  Rating(RatingConfig),
  Number(NumberConfig),
  Select(ChoiceConfig),
  Tags(ChoiceConfig),
  Notes(EmptyConfig),
}

impl MetricKind {
  pub fn metric_type(&self) -> MetricType {
    match self {
      Self::Boolean(_) => MetricType::Boolean,
      Self::Rating(_) => MetricType::Rating,
      Self::Number(_) => MetricType::Number,
      Self::Select(_) => MetricType::Select,
      Self::Tags(_) => MetricType::Tags,
      Self::Notes(_) => MetricType::Notes,
    }
  }

  /// The discriminant string stored in the `metric_type` column.
  pub fn discriminant(&self) -> &'static str { self.metric_type().into() }

  /// Serialise the config payload (without the type tag) for the
  /// `config_json` column.
  pub fn config_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(
      full
        .get("config")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({})),
    )
  }

  /// Rebuild from the discriminant and config payload stored in the
  /// database. Fails if the payload does not have the shape the type needs.
  pub fn from_parts(
    discriminant: &str,
    config: serde_json::Value,
  ) -> Result<Self> {
    let wrapped = serde_json::json!({ "type": discriminant, "config": config });
    Ok(serde_json::from_value(wrapped)?)
  }
}

// ─── MetricDefinition ────────────────────────────────────────────────────────

/// A user-defined metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
  pub metric_id:   Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  #[serde(flatten)]
  pub kind:        MetricKind,
  pub direction:   Direction,
  pub required:    bool,
  /// `None` while the metric is active.
  pub archived_at: Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
}

impl MetricDefinition {
  pub fn is_active(&self) -> bool { self.archived_at.is_none() }

  pub fn metric_type(&self) -> MetricType { self.kind.metric_type() }
}

/// Input to [`crate::store::CheckinStore::create_metric`]. Identifiers and
/// timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMetric {
  pub user_id:   Uuid,
  pub name:      String,
  pub kind:      MetricKind,
  pub direction: Direction,
  pub required:  bool,
}

impl NewMetric {
  /// Convenience constructor: positive direction, optional.
  pub fn new(user_id: Uuid, name: impl Into<String>, kind: MetricKind) -> Self {
    Self {
      user_id,
      name: name.into(),
      kind,
      direction: Direction::default(),
      required: false,
    }
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_serialises_with_type_tag() {
    let kind = MetricKind::Rating(RatingConfig {
      scale_min: 1,
      scale_max: 10,
      labels:    None,
    });
    let json = serde_json::to_value(&kind).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "type": "rating",
        "config": { "scaleMin": 1, "scaleMax": 10 }
      })
    );
  }

  #[test]
  fn empty_config_is_an_empty_object() {
    let json = MetricKind::Notes(EmptyConfig {}).config_json().unwrap();
    assert_eq!(json, serde_json::json!({}));
    let back = MetricKind::from_parts("boolean", json).unwrap();
    assert_eq!(back.metric_type(), MetricType::Boolean);
  }

  #[test]
  fn from_parts_rejects_mismatched_shape() {
    let err = MetricKind::from_parts(
      "select",
      serde_json::json!({ "scaleMin": 1, "scaleMax": 5 }),
    );
    assert!(err.is_err());
  }

  #[test]
  fn discriminant_matches_serde_tag() {
    let kind = MetricKind::Tags(ChoiceConfig { options: vec![] });
    let json = serde_json::to_value(&kind).unwrap();
    assert_eq!(json["type"], kind.discriminant());
    assert_eq!("tags".parse::<MetricType>().unwrap(), MetricType::Tags);
  }

  #[test]
  fn definition_flattens_kind() {
    let def = MetricDefinition {
      metric_id:   Uuid::nil(),
      user_id:     Uuid::nil(),
      name:        "Mood".into(),
      kind:        MetricKind::Boolean(EmptyConfig {}),
      direction:   Direction::Positive,
      required:    true,
      archived_at: None,
      created_at:  Utc::now(),
    };
    let json = serde_json::to_value(&def).unwrap();
    assert_eq!(json["type"], "boolean");
    assert_eq!(json["metricId"], Uuid::nil().to_string());
    let back: MetricDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(back, def);
  }
}
