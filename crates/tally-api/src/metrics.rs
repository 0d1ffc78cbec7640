//! Handlers for `/users/:user_id/metrics` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/metrics` | Optional `?include_archived=true` |
//! | `POST` | `/metrics` | Body: [`CreateBody`]; returns 201 + stored metric |
//! | `GET`  | `/metrics/:id` | 404 if not found; archived metrics are returned |
//! | `POST` | `/metrics/:id/archive` | Soft delete |
//! | `POST` | `/metrics/:id/restore` | Undo archive |
//! | `PUT`  | `/metrics/:id/required` | Body: `{"required":true}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  metric::{Direction, MetricDefinition, MetricKind, NewMetric},
  store::CheckinStore,
  validate::validate_new_metric,
};
use uuid::Uuid;

use crate::{caller::Caller, error::ApiError, json::ApiJson};

fn not_found(metric_id: Uuid) -> ApiError {
  ApiError::NotFound(format!("metric {metric_id} not found"))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_archived: bool,
}

/// `GET /users/:user_id/metrics[?include_archived=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(user_id): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<MetricDefinition>>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let metrics = store
    .list_metrics(user_id, params.include_archived)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(metrics))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /users/:user_id/metrics`, e.g.
/// `{"name":"Mood","type":"rating","config":{"scaleMin":1,"scaleMax":10},"required":true}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub name:      String,
  #[serde(flatten)]
  pub kind:      MetricKind,
  #[serde(default)]
  pub direction: Direction,
  #[serde(default)]
  pub required:  bool,
}

/// `POST /users/:user_id/metrics`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(user_id): Path<Uuid>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;

  let input = NewMetric {
    user_id,
    name: body.name,
    kind: body.kind,
    direction: body.direction,
    required: body.required,
  };
  validate_new_metric(&input)?;

  let metric = store.create_metric(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(metric)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:user_id/metrics/:metric_id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, metric_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MetricDefinition>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let metric = store
    .get_metric(user_id, metric_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(metric_id))?;
  Ok(Json(metric))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /users/:user_id/metrics/:metric_id/archive`
pub async fn archive<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, metric_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MetricDefinition>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let metric = store
    .archive_metric(user_id, metric_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(metric_id))?;
  tracing::info!(%user_id, %metric_id, "metric archived");
  Ok(Json(metric))
}

/// `POST /users/:user_id/metrics/:metric_id/restore`
pub async fn restore<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, metric_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MetricDefinition>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let metric = store
    .restore_metric(user_id, metric_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(metric_id))?;
  Ok(Json(metric))
}

#[derive(Debug, Deserialize)]
pub struct RequiredBody {
  pub required: bool,
}

/// `PUT /users/:user_id/metrics/:metric_id/required`
pub async fn set_required<S>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path((user_id, metric_id)): Path<(Uuid, Uuid)>,
  ApiJson(body): ApiJson<RequiredBody>,
) -> Result<Json<MetricDefinition>, ApiError>
where
  S: CheckinStore,
{
  caller.authorize(user_id)?;
  let metric = store
    .set_required(user_id, metric_id, body.required)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(metric_id))?;
  Ok(Json(metric))
}
