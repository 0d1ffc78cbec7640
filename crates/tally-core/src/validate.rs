//! Per-type rules: metric configs at definition time, entry values at
//! submission time.

use std::collections::HashSet;

use crate::{
  ValidationError,
  day::{EntryInput, EntryValue},
  metric::{ChoiceConfig, MetricDefinition, MetricKind, NewMetric},
};

/// Longest accepted note, in characters.
pub const MAX_NOTE_CHARS: usize = 2000;

// ─── Definition time ─────────────────────────────────────────────────────────

/// Check a metric before it is stored.
pub fn validate_new_metric(input: &NewMetric) -> Result<(), ValidationError> {
  if input.name.trim().is_empty() {
    return Err(ValidationError::EmptyName);
  }
  match config_problem(&input.kind) {
    Some(reason) => Err(ValidationError::InvalidConfig(reason)),
    None => Ok(()),
  }
}

/// Describe what is wrong with a config, if anything.
pub fn config_problem(kind: &MetricKind) -> Option<String> {
  match kind {
    MetricKind::Boolean(_) | MetricKind::Notes(_) => None,
    MetricKind::Rating(cfg) => {
      if cfg.scale_min > cfg.scale_max {
        return Some(format!(
          "scaleMin {} is greater than scaleMax {}",
          cfg.scale_min, cfg.scale_max
        ));
      }
      let steps = i64::from(cfg.scale_max) - i64::from(cfg.scale_min) + 1;
      match &cfg.labels {
        Some(labels) if labels.len() as i64 > steps => Some(format!(
          "{} labels for a scale of {steps} steps",
          labels.len()
        )),
        _ => None,
      }
    }
    MetricKind::Number(cfg) => {
      let non_finite = [cfg.min, cfg.max]
        .into_iter()
        .flatten()
        .any(|b| !b.is_finite());
      if non_finite {
        return Some("bounds must be finite".to_owned());
      }
      match (cfg.min, cfg.max) {
        (Some(min), Some(max)) if min > max => {
          Some(format!("min {min} is greater than max {max}"))
        }
        _ => None,
      }
    }
    MetricKind::Select(cfg) | MetricKind::Tags(cfg) => choice_problem(cfg),
  }
}

fn choice_problem(cfg: &ChoiceConfig) -> Option<String> {
  if cfg.options.is_empty() {
    return Some("at least one option is required".to_owned());
  }
  let mut seen = HashSet::new();
  for option in &cfg.options {
    if option.key.is_empty() {
      return Some("option keys must not be empty".to_owned());
    }
    if !seen.insert(option.key.as_str()) {
      return Some(format!("duplicate option key {:?}", option.key));
    }
  }
  None
}

// ─── Entry time ──────────────────────────────────────────────────────────────

/// Validate one submitted value against its (already resolved, active)
/// metric and return the typed value to store.
pub fn validate_entry(
  metric: &MetricDefinition,
  input: &EntryInput,
) -> Result<EntryValue, ValidationError> {
  let metric_id = metric.metric_id;
  let metric_type = metric.metric_type();

  if let Some(reason) = config_problem(&metric.kind) {
    return Err(ValidationError::MalformedMetric { metric_id, reason });
  }

  let expected = metric_type.value_field();
  if let Some(field) = input
    .populated_fields()
    .into_iter()
    .find(|f| *f != expected)
  {
    return Err(ValidationError::UnexpectedValue {
      metric_id,
      metric_type,
      field,
    });
  }

  let missing = ValidationError::MissingValue {
    metric_id,
    metric_type,
    field: expected,
  };

  match &metric.kind {
    MetricKind::Boolean(_) => {
      input.bool_value.map(EntryValue::Boolean).ok_or(missing)
    }

    MetricKind::Rating(cfg) => {
      let value = input.int_value.ok_or(missing)?;
      if value < i64::from(cfg.scale_min) || value > i64::from(cfg.scale_max) {
        return Err(ValidationError::RatingOutOfRange {
          metric_id,
          value,
          min: cfg.scale_min,
          max: cfg.scale_max,
        });
      }
      Ok(EntryValue::Rating(value))
    }

    MetricKind::Number(cfg) => {
      let value = input.float_value.ok_or(missing)?;
      if !value.is_finite() {
        return Err(ValidationError::NonFiniteNumber { metric_id });
      }
      let below = cfg.min.is_some_and(|min| value < min);
      let above = cfg.max.is_some_and(|max| value > max);
      if below || above {
        return Err(ValidationError::NumberOutOfRange {
          metric_id,
          value,
          min: cfg.min,
          max: cfg.max,
        });
      }
      Ok(EntryValue::Number(value))
    }

    MetricKind::Select(cfg) => {
      let key = input.select_key.as_ref().ok_or(missing)?;
      if !cfg.has_key(key) {
        return Err(ValidationError::UnknownOption {
          metric_id,
          key:     key.clone(),
          allowed: cfg.keys(),
        });
      }
      Ok(EntryValue::Select(key.clone()))
    }

    MetricKind::Tags(cfg) => {
      let keys = input.tag_keys.as_ref().ok_or(missing)?;
      if keys.is_empty() {
        return Err(ValidationError::NoTags { metric_id });
      }
      if let Some(bad) = keys.iter().find(|k| !cfg.has_key(k)) {
        return Err(ValidationError::UnknownOption {
          metric_id,
          key:     bad.clone(),
          allowed: cfg.keys(),
        });
      }
      let mut keys = keys.clone();
      keys.sort();
      keys.dedup();
      Ok(EntryValue::Tags(keys))
    }

    MetricKind::Notes(_) => {
      let text = input.text_value.as_ref().ok_or(missing)?;
      if text.is_empty() {
        return Err(ValidationError::EmptyNote { metric_id });
      }
      let len = text.chars().count();
      if len > MAX_NOTE_CHARS {
        return Err(ValidationError::NoteTooLong {
          metric_id,
          len,
          max: MAX_NOTE_CHARS,
        });
      }
      Ok(EntryValue::Notes(text.clone()))
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::metric::{
    ChoiceOption, Direction, EmptyConfig, NumberConfig, RatingConfig,
  };

  fn metric(kind: MetricKind) -> MetricDefinition {
    MetricDefinition {
      metric_id: Uuid::new_v4(),
      user_id: Uuid::new_v4(),
      name: "m".into(),
      kind,
      direction: Direction::Positive,
      required: false,
      archived_at: None,
      created_at: Utc::now(),
    }
  }

  fn rating(min: i32, max: i32) -> MetricKind {
    MetricKind::Rating(RatingConfig { scale_min: min, scale_max: max, labels: None })
  }

  fn mood_tags() -> MetricKind {
    MetricKind::Tags(ChoiceConfig {
      options: vec![ChoiceOption::new("happy", "Happy"), ChoiceOption::new("sad", "Sad")],
    })
  }

  // ── Boolean ─────────────────────────────────────────────────────────────

  #[test]
  fn boolean_accepts_false_but_not_absence() {
    let m = metric(MetricKind::Boolean(EmptyConfig {}));
    assert_eq!(
      validate_entry(&m, &EntryInput::boolean(m.metric_id, false)),
      Ok(EntryValue::Boolean(false))
    );
    let empty = EntryInput { metric_id: m.metric_id, ..Default::default() };
    assert!(matches!(
      validate_entry(&m, &empty),
      Err(ValidationError::MissingValue { field: "boolValue", .. })
    ));
  }

  #[test]
  fn foreign_slot_is_rejected() {
    let m = metric(MetricKind::Boolean(EmptyConfig {}));
    let mut input = EntryInput::boolean(m.metric_id, true);
    input.int_value = Some(1);
    assert!(matches!(
      validate_entry(&m, &input),
      Err(ValidationError::UnexpectedValue { field: "intValue", .. })
    ));
  }

  // ── Rating ──────────────────────────────────────────────────────────────

  #[test]
  fn rating_bounds_are_inclusive() {
    let m = metric(rating(1, 10));
    for ok in [1, 5, 10] {
      assert_eq!(
        validate_entry(&m, &EntryInput::int(m.metric_id, ok)),
        Ok(EntryValue::Rating(ok))
      );
    }
    for bad in [0, 11, i64::MAX] {
      let err = validate_entry(&m, &EntryInput::int(m.metric_id, bad)).unwrap_err();
      assert_eq!(
        err,
        ValidationError::RatingOutOfRange { metric_id: m.metric_id, value: bad, min: 1, max: 10 }
      );
    }
  }

  #[test]
  fn rating_error_names_metric_and_value() {
    let m = metric(rating(1, 10));
    let err = validate_entry(&m, &EntryInput::int(m.metric_id, 11)).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(&m.metric_id.to_string()));
    assert!(msg.contains("11"));
    assert!(msg.contains("[1, 10]"));
  }

  // ── Number ──────────────────────────────────────────────────────────────

  #[test]
  fn number_without_bounds_accepts_anything_finite() {
    let m = metric(MetricKind::Number(NumberConfig::default()));
    assert_eq!(
      validate_entry(&m, &EntryInput::float(m.metric_id, -1e9)),
      Ok(EntryValue::Number(-1e9))
    );
    assert_eq!(
      validate_entry(&m, &EntryInput::float(m.metric_id, f64::NAN)),
      Err(ValidationError::NonFiniteNumber { metric_id: m.metric_id })
    );
  }

  #[test]
  fn number_respects_each_bound() {
    let m = metric(MetricKind::Number(NumberConfig {
      unit: Some("h".into()),
      min:  Some(0.0),
      max:  Some(24.0),
    }));
    assert!(validate_entry(&m, &EntryInput::float(m.metric_id, 0.0)).is_ok());
    assert!(validate_entry(&m, &EntryInput::float(m.metric_id, 24.0)).is_ok());
    assert!(matches!(
      validate_entry(&m, &EntryInput::float(m.metric_id, -0.5)),
      Err(ValidationError::NumberOutOfRange { .. })
    ));
    assert!(matches!(
      validate_entry(&m, &EntryInput::float(m.metric_id, 24.01)),
      Err(ValidationError::NumberOutOfRange { .. })
    ));

    let min_only = metric(MetricKind::Number(NumberConfig { min: Some(10.0), ..Default::default() }));
    assert!(validate_entry(&min_only, &EntryInput::float(min_only.metric_id, 1e12)).is_ok());
  }

  // ── Select / Tags ───────────────────────────────────────────────────────

  #[test]
  fn select_requires_a_known_key() {
    let m = metric(MetricKind::Select(ChoiceConfig {
      options: vec![ChoiceOption::new("gym", "Gym"), ChoiceOption::new("run", "Run")],
    }));
    assert_eq!(
      validate_entry(&m, &EntryInput::select(m.metric_id, "run")),
      Ok(EntryValue::Select("run".into()))
    );
    assert_eq!(
      validate_entry(&m, &EntryInput::select(m.metric_id, "swim")),
      Err(ValidationError::UnknownOption {
        metric_id: m.metric_id,
        key:       "swim".into(),
        allowed:   vec!["gym".into(), "run".into()],
      })
    );
  }

  #[test]
  fn tags_reject_unknown_key() {
    let m = metric(mood_tags());
    assert!(matches!(
      validate_entry(&m, &EntryInput::tags(m.metric_id, ["angry"])),
      Err(ValidationError::UnknownOption { ref key, .. }) if key == "angry"
    ));
    assert!(matches!(
      validate_entry(&m, &EntryInput::tags(m.metric_id, ["happy", "angry"])),
      Err(ValidationError::UnknownOption { .. })
    ));
  }

  #[test]
  fn tags_need_at_least_one_key() {
    let m = metric(mood_tags());
    assert_eq!(
      validate_entry(&m, &EntryInput::tags(m.metric_id, Vec::<String>::new())),
      Err(ValidationError::NoTags { metric_id: m.metric_id })
    );
  }

  #[test]
  fn tags_are_stored_as_a_set() {
    let m = metric(mood_tags());
    assert_eq!(
      validate_entry(&m, &EntryInput::tags(m.metric_id, ["sad", "happy", "sad"])),
      Ok(EntryValue::Tags(vec!["happy".into(), "sad".into()]))
    );
  }

  // ── Notes ───────────────────────────────────────────────────────────────

  #[test]
  fn notes_length_limits() {
    let m = metric(MetricKind::Notes(EmptyConfig {}));
    assert_eq!(
      validate_entry(&m, &EntryInput::text(m.metric_id, "")),
      Err(ValidationError::EmptyNote { metric_id: m.metric_id })
    );
    assert_eq!(
      validate_entry(&m, &EntryInput::text(m.metric_id, "x".repeat(2001))),
      Err(ValidationError::NoteTooLong { metric_id: m.metric_id, len: 2001, max: 2000 })
    );
    assert!(validate_entry(&m, &EntryInput::text(m.metric_id, "x".repeat(2000))).is_ok());
    assert_eq!(
      validate_entry(&m, &EntryInput::text(m.metric_id, "ok")),
      Ok(EntryValue::Notes("ok".into()))
    );
  }

  #[test]
  fn notes_count_characters_not_bytes() {
    let m = metric(MetricKind::Notes(EmptyConfig {}));
    let text = "é".repeat(2000);
    assert!(text.len() > 2000);
    assert!(validate_entry(&m, &EntryInput::text(m.metric_id, text)).is_ok());
  }

  // ── Configs ─────────────────────────────────────────────────────────────

  #[test]
  fn malformed_config_fails_at_entry_time() {
    let m = metric(rating(10, 1));
    assert!(matches!(
      validate_entry(&m, &EntryInput::int(m.metric_id, 5)),
      Err(ValidationError::MalformedMetric { .. })
    ));
  }

  #[test]
  fn config_checks() {
    assert!(config_problem(&rating(1, 1)).is_none());
    assert!(config_problem(&rating(2, 1)).is_some());
    assert!(
      config_problem(&MetricKind::Rating(RatingConfig {
        scale_min: 1,
        scale_max: 3,
        labels:    Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
      }))
      .is_some()
    );
    assert!(
      config_problem(&MetricKind::Number(NumberConfig {
        min: Some(5.0),
        max: Some(1.0),
        ..Default::default()
      }))
      .is_some()
    );
    assert!(
      config_problem(&MetricKind::Number(NumberConfig {
        max: Some(f64::INFINITY),
        ..Default::default()
      }))
      .is_some()
    );
    assert!(config_problem(&MetricKind::Select(ChoiceConfig { options: vec![] })).is_some());
    assert!(
      config_problem(&MetricKind::Tags(ChoiceConfig {
        options: vec![ChoiceOption::new("a", "A"), ChoiceOption::new("a", "Again")],
      }))
      .is_some()
    );
    assert!(config_problem(&mood_tags()).is_none());
  }

  #[test]
  fn new_metric_needs_a_name() {
    let input = NewMetric::new(Uuid::new_v4(), "   ", MetricKind::Boolean(EmptyConfig {}));
    assert_eq!(validate_new_metric(&input), Err(ValidationError::EmptyName));

    let input = NewMetric::new(Uuid::new_v4(), "Mood", rating(5, 1));
    assert!(matches!(validate_new_metric(&input), Err(ValidationError::InvalidConfig(_))));
  }
}
