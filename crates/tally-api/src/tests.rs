//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tally_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{api_router, caller::CALLER_HEADER};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  api_router(Arc::new(store))
}

async fn send(
  app: &Router,
  method: Method,
  uri: &str,
  caller: Option<Uuid>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(caller) = caller {
    req = req.header(CALLER_HEADER, caller.to_string());
  }
  let req = match body {
    Some(json) => req
      .header("content-type", "application/json")
      .body(Body::from(json.to_string())),
    None => req.body(Body::empty()),
  }
  .unwrap();

  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

async fn create_rating(app: &Router, user: Uuid) -> String {
  let (status, body) = send(
    app,
    Method::POST,
    &format!("/users/{user}/metrics"),
    Some(user),
    Some(json!({
      "name": "Mood",
      "type": "rating",
      "config": { "scaleMin": 1, "scaleMax": 10 },
      "required": true
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["metricId"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn missing_caller_is_unauthenticated() {
  let app = app().await;
  let user = Uuid::new_v4();
  let (status, _) =
    send(&app, Method::GET, &format!("/users/{user}/metrics"), None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn other_callers_are_forbidden() {
  let app = app().await;
  let user = Uuid::new_v4();
  let (status, body) = send(
    &app,
    Method::GET,
    &format!("/users/{user}/metrics"),
    Some(Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn create_rejects_invalid_config() {
  let app = app().await;
  let user = Uuid::new_v4();
  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/metrics"),
    Some(user),
    Some(json!({ "name": "Mood", "type": "select", "config": { "options": [] } })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("at least one option"));
}

#[tokio::test]
async fn submit_then_read_day() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;
  let uri = format!("/users/{user}/days/2025-06-01");

  let (status, body) = send(
    &app,
    Method::POST,
    &uri,
    Some(user),
    Some(json!({ "status": "draft", "entries": [{ "metricId": metric, "intValue": 8 }] })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body, json!({ "completionPct": 100, "savedCount": 1 }));

  let (status, body) = send(&app, Method::GET, &uri, Some(user), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["checkin"]["status"], "draft");
  assert_eq!(body["checkin"]["completionPct"], 100);
  assert_eq!(body["entries"][0]["value"], json!({ "type": "rating", "value": 8 }));
}

#[tokio::test]
async fn invalid_entry_is_a_bad_request_and_writes_nothing() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;
  let uri = format!("/users/{user}/days/2025-06-01");

  let (status, body) = send(
    &app,
    Method::POST,
    &uri,
    Some(user),
    Some(json!({ "status": "submitted", "entries": [{ "metricId": metric, "intValue": 11 }] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let message = body["error"].as_str().unwrap();
  assert!(message.contains(&metric) && message.contains("[1, 10]"), "{message}");

  let (_, body) = send(&app, Method::GET, &uri, Some(user), None).await;
  assert_eq!(body["checkin"], Value::Null);
  assert_eq!(body["entries"], json!([]));
}

#[tokio::test]
async fn submitting_for_someone_else_is_forbidden() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/days/2025-06-01"),
    Some(Uuid::new_v4()),
    Some(json!({ "status": "draft", "entries": [{ "metricId": metric, "intValue": 5 }] })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bad_status_and_day_id_are_bad_requests() {
  let app = app().await;
  let user = Uuid::new_v4();

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/days/2025-06-01"),
    Some(user),
    Some(json!({ "status": "final" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("final"));

  let (status, _) = send(
    &app,
    Method::GET,
    &format!("/users/{user}/days/June-1st"),
    Some(user),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn archive_unknown_metric_is_not_found() {
  let app = app().await;
  let user = Uuid::new_v4();
  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/metrics/{}/archive", Uuid::new_v4()),
    Some(user),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkins_and_series_over_a_range() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;

  for (day, value) in [("2025-06-01", 3), ("2025-06-02", 7)] {
    let (status, _) = send(
      &app,
      Method::POST,
      &format!("/users/{user}/days/{day}"),
      Some(user),
      Some(json!({ "status": "submitted", "entries": [{ "metricId": metric, "intValue": value }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }

  let (status, body) = send(
    &app,
    Method::GET,
    &format!("/users/{user}/checkins?from=2025-06-02&to=2025-06-30"),
    Some(user),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["dayId"], "2025-06-02");

  let (status, body) = send(
    &app,
    Method::GET,
    &format!("/users/{user}/metrics/{metric}/series?from=2025-06-01&to=2025-06-30"),
    Some(user),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 2);

  let (status, _) = send(
    &app,
    Method::GET,
    &format!("/users/{user}/checkins?from=2025-07-01&to=2025-06-01"),
    Some(user),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn required_flag_and_restore_round_trip() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;
  let base = format!("/users/{user}/metrics/{metric}");

  let (status, body) = send(
    &app,
    Method::PUT,
    &format!("{base}/required"),
    Some(user),
    Some(json!({ "required": false })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["required"], false);

  let (_, body) = send(&app, Method::POST, &format!("{base}/archive"), Some(user), None).await;
  assert!(body["archivedAt"].is_string());

  let (_, body) = send(&app, Method::POST, &format!("{base}/restore"), Some(user), None).await;
  assert_eq!(body["archivedAt"], Value::Null);

  let (_, body) = send(&app, Method::GET, &base, Some(user), None).await;
  assert_eq!(body["type"], "rating");
  assert_eq!(body["config"]["scaleMax"], 10);
}

#[tokio::test]
async fn badly_typed_entry_value_is_a_json_bad_request() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;
  let uri = format!("/users/{user}/days/2025-06-01");

  for value in [json!("eight"), json!(8.5)] {
    let (status, body) = send(
      &app,
      Method::POST,
      &uri,
      Some(user),
      Some(json!({ "status": "draft", "entries": [{ "metricId": metric, "intValue": value }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    let message = body["error"].as_str().unwrap();
    assert!(message.contains(&metric) && message.contains("invalid type"), "{message}");
  }

  let (_, body) = send(&app, Method::GET, &uri, Some(user), None).await;
  assert_eq!(body["checkin"], Value::Null);
  assert_eq!(body["entries"], json!([]));
}

#[tokio::test]
async fn badly_typed_entry_from_another_caller_is_still_forbidden() {
  let app = app().await;
  let user = Uuid::new_v4();
  let metric = create_rating(&app, user).await;

  let (status, _) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/days/2025-06-01"),
    Some(Uuid::new_v4()),
    Some(json!({ "status": "draft", "entries": [{ "metricId": metric, "intValue": "eight" }] })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
  let app = app().await;
  let user = Uuid::new_v4();

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/metrics"),
    Some(user),
    Some(json!({ "name": "Done", "type": "boolean" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = send(
    &app,
    Method::POST,
    &format!("/users/{user}/days/2025-06-01"),
    Some(user),
    Some(json!({ "entries": [] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}
