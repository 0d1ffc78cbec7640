//! Handlers for day submission and the read models built on it.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/days/:day_id` | Stored check-in + entries |
//! | `POST` | `/days/:day_id` | Body: [`SubmitBody`]; all-or-nothing |
//! | `GET`  | `/checkins` | `?from=YYYY-MM-DD&to=YYYY-MM-DD`, inclusive |
//! | `GET`  | `/metrics/:id/series` | `?from&to`; one metric's entries |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use tally_core::{
  day::{CheckinStatus, DayCheckin, DayEntry, DayId, DayRange, DayView, EntryInput},
  engine::{SubmitDay, SubmitOutcome},
  store::CheckinStore,
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError, json::ApiJson};

// ─── Day view ─────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/days/:day_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, day_id)): Path<(Uuid, String)>,
) -> Result<Json<DayView>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let day_id = DayId::parse(&day_id)?;
  let view = store
    .get_day(user_id, day_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(view))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users/:user_id/days/:day_id`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  /// Kept as a string so a bad literal is reported as a validation error.
  pub status:  String,
  /// Decoded one by one so a badly typed value is reported against its
  /// metric.
  #[serde(default)]
  pub entries: Vec<Value>,
}

fn decode_entries(raw: Vec<Value>) -> Result<Vec<EntryInput>, ApiError> {
  raw
    .into_iter()
    .enumerate()
    .map(|(index, value)| {
      let metric_id = value
        .get("metricId")
        .and_then(Value::as_str)
        .map(str::to_owned);
      serde_json::from_value(value).map_err(|e| {
        ApiError::BadRequest(match metric_id {
          Some(id) => format!("metric {id}: {e}"),
          None => format!("entry {index}: {e}"),
        })
      })
    })
    .collect()
}

/// `POST /users/:user_id/days/:day_id`
///
/// The caller/user check happens inside the submission engine.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, day_id)): Path<(Uuid, String)>,
  ApiJson(body): ApiJson<SubmitBody>,
) -> Result<Json<SubmitOutcome>, ApiError>
where
  S: CheckinStore,
{
  let entries = match decode_entries(body.entries) {
    Ok(entries) => entries,
    Err(err) => {
      // Same precedence as the engine: caller, status, day id, entries.
      caller.authorize(user_id)?;
      CheckinStatus::parse(&body.status)?;
      DayId::parse(&day_id)?;
      return Err(err);
    }
  };

  let request = SubmitDay {
    user_id,
    day_id,
    status: body.status,
    entries,
  };
  let outcome = store.submit_day(caller.0, request).await?;
  Ok(Json(outcome))
}

// ─── Ranges ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: String,
  pub to:   String,
}

impl RangeParams {
  fn parse(&self) -> Result<DayRange, ApiError> {
    Ok(DayRange::parse(&self.from, &self.to)?)
  }
}

/// `GET /users/:user_id/checkins?from=...&to=...`
pub async fn checkins<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(user_id): Path<Uuid>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<DayCheckin>>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let range = params.parse()?;
  let checkins = store
    .list_checkins(user_id, range)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(checkins))
}

/// `GET /users/:user_id/metrics/:metric_id/series?from=...&to=...`
pub async fn series<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, metric_id)): Path<(Uuid, Uuid)>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<DayEntry>>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let range = params.parse()?;

  store
    .get_metric(user_id, metric_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("metric {metric_id} not found")))?;

  let entries = store
    .metric_series(user_id, metric_id, range)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}
