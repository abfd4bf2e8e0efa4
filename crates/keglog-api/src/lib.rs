//! JSON REST API for keglog.
//!
//! The router is generic: any [`keglog_core::store::KegStore`] can back it,
//! and batch sync goes through a [`keglog_core::store::BatchSource`].
//! Transport concerns (TLS, static files) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", keglog_api::api_router(store.clone(), brewfather.clone()))
//! ```

pub mod batches;
pub mod error;
pub mod kegs;
pub mod people;
pub mod settings;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use keglog_core::store::{BatchSource, KegStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S, B> {
  pub store:   Arc<S>,
  pub batches: Arc<B>,
}

// Manual impl so S and B are not required to be Clone themselves.
impl<S, B> Clone for ApiState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      batches: self.batches.clone(),
    }
  }
}

/// Build the API router over `store` and the external batch source.
///
/// Returns `Router<()>` so it nests cleanly into a parent router of any
/// state type.
pub fn api_router<S, B>(store: Arc<S>, batches: Arc<B>) -> Router<()>
where
  S: KegStore + 'static,
  B: BatchSource + 'static,
{
  Router::new()
    // Kegs
    .route("/kegs", get(kegs::list::<S, B>).post(kegs::create::<S, B>))
    .route(
      "/kegs/{id}",
      put(kegs::update::<S, B>).delete(kegs::remove::<S, B>),
    )
    .route("/kegs/{id}/reset", post(kegs::reset::<S, B>))
    // Batches
    .route("/batches", get(batches::list::<S, B>))
    .route("/batches/sync", post(batches::sync::<S, B>))
    // People and locations
    .route(
      "/people",
      get(people::list_people::<S, B>).post(people::create_person::<S, B>),
    )
    .route("/people/{id}", delete(people::delete_person::<S, B>))
    .route(
      "/locations",
      get(people::list_locations::<S, B>).post(people::create_location::<S, B>),
    )
    .route("/locations/{id}", delete(people::delete_location::<S, B>))
    // Settings
    .route(
      "/settings/brewery",
      get(settings::get_brewery::<S, B>).put(settings::update_brewery::<S, B>),
    )
    // Statistics
    .route("/stats", get(stats::report::<S, B>))
    .route("/stats/events", get(stats::events::<S, B>))
    .with_state(ApiState { store, batches })
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
  };
  use keglog_core::{batch::NewBatch, store::BatchSource};
  use keglog_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::api_router;

  /// A canned batch source for tests.
  struct StaticBatches(Vec<NewBatch>);

  impl BatchSource for StaticBatches {
    type Error = std::convert::Infallible;

    async fn fetch_batches(&self) -> Result<Vec<NewBatch>, Self::Error> {
      Ok(self.0.clone())
    }
  }

  /// A batch source whose fetch always fails.
  struct FailingBatches;

  impl BatchSource for FailingBatches {
    type Error = std::io::Error;

    async fn fetch_batches(&self) -> Result<Vec<NewBatch>, Self::Error> {
      Err(std::io::Error::other("connection refused"))
    }
  }

  fn batch(id: &str, recipe_name: &str, style: &str) -> NewBatch {
    NewBatch {
      id:            id.into(),
      batch_no:      Some(1),
      name:          format!("Batch {id}"),
      style:         style.into(),
      abv:           Some(5.5),
      brew_date:     "2024-03-01".into(),
      bottling_date: "2024-03-20".into(),
      status:        "Conditioning".into(),
      recipe_name:   recipe_name.into(),
      batch_notes:   String::new(),
    }
  }

  async fn make_router(batches: Vec<NewBatch>) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store), Arc::new(StaticBatches(batches)))
  }

  async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  // ── Kegs ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_list_kegs() {
    let app = make_router(vec![]).await;

    let (status, keg) = request(&app, "POST", "/kegs", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(keg["label"], "Keg #1");
    assert_eq!(keg["status"], "empty");
    assert_eq!(keg["batch"], Value::Null);

    let (status, kegs) = request(&app, "GET", "/kegs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kegs.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn updating_a_missing_keg_returns_404() {
    let app = make_router(vec![]).await;
    let (status, body) =
      request(&app, "PUT", "/kegs/42", Some(json!({"label": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("42"));
  }

  #[tokio::test]
  async fn update_nests_the_batch_summary() {
    let app = make_router(vec![batch("b1", "West Coast IPA", "IPA")]).await;
    request(&app, "POST", "/batches/sync", None).await;
    request(&app, "POST", "/kegs", None).await;

    let (status, keg) = request(
      &app,
      "PUT",
      "/kegs/1",
      Some(json!({"batch_id": "b1", "status": "full"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keg["status"], "full");
    assert_eq!(keg["batch"]["recipe_name"], "West Coast IPA");
    assert_eq!(keg["batch"]["style"], "IPA");
  }

  #[tokio::test]
  async fn delete_with_batch_conflicts_until_cleared() {
    let app = make_router(vec![batch("b1", "", "IPA")]).await;
    request(&app, "POST", "/batches/sync", None).await;
    request(&app, "POST", "/kegs", None).await;
    request(&app, "PUT", "/kegs/1", Some(json!({"batch_id": "b1"}))).await;

    let (status, _) = request(&app, "DELETE", "/kegs/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    request(&app, "PUT", "/kegs/1", Some(json!({"clear_batch": true}))).await;
    let (status, body) = request(&app, "DELETE", "/kegs/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    // The deletion tombstone is on the feed.
    let (_, events) = request(&app, "GET", "/stats/events", None).await;
    assert_eq!(events[0]["event_type"], "deleted");
    assert_eq!(events[0]["keg_id"], 1);
  }

  #[tokio::test]
  async fn reset_clears_and_logs_the_return() {
    let app = make_router(vec![batch("b1", "Oatmeal Stout", "Stout")]).await;
    request(&app, "POST", "/batches/sync", None).await;
    request(&app, "POST", "/kegs", None).await;
    request(&app, "POST", "/people", Some(json!({"name": "Troy"}))).await;
    request(
      &app,
      "PUT",
      "/kegs/1",
      Some(json!({"batch_id": "b1", "location": "Troy", "status": "on_tap"})),
    )
    .await;

    let (status, keg) = request(&app, "POST", "/kegs/1/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keg["status"], "empty");
    assert_eq!(keg["location"], "");
    assert_eq!(keg["batch"], Value::Null);

    let (_, events) = request(&app, "GET", "/stats/events", None).await;
    assert_eq!(events[0]["event_type"], "returned");
    assert_eq!(events[0]["person"], "Troy");
    assert_eq!(events[0]["batch_name"], "Oatmeal Stout");
  }

  // ── People and locations ────────────────────────────────────────────────────

  #[tokio::test]
  async fn person_creation_validates_and_conflicts() {
    let app = make_router(vec![]).await;

    let (status, person) =
      request(&app, "POST", "/people", Some(json!({"name": " Troy "}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(person["name"], "Troy");

    let (status, _) =
      request(&app, "POST", "/people", Some(json!({"name": "Troy"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) =
      request(&app, "POST", "/people", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The same name cannot exist as a location.
    let (status, body) =
      request(&app, "POST", "/locations", Some(json!({"name": "Troy"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("person"));
  }

  #[tokio::test]
  async fn deleting_a_missing_person_returns_404() {
    let app = make_router(vec![]).await;
    let (status, _) = request(&app, "DELETE", "/people/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Sync ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn sync_upserts_and_reports_the_count() {
    let app = make_router(vec![
      batch("b1", "IPA v4", "IPA"),
      batch("b2", "Saison", "Saison"),
    ])
    .await;

    let (status, body) = request(&app, "POST", "/batches/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["synced"], 2);

    let (_, batches) = request(&app, "GET", "/batches", None).await;
    assert_eq!(batches.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn sync_failure_surfaces_as_502() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = api_router(Arc::new(store), Arc::new(FailingBatches));

    let (status, body) = request(&app, "POST", "/batches/sync", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
      body["error"]
        .as_str()
        .unwrap()
        .contains("connection refused")
    );
  }

  // ── Settings ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn brewery_settings_round_trip() {
    let app = make_router(vec![]).await;

    let (_, body) = request(&app, "GET", "/settings/brewery", None).await;
    assert_eq!(body["name"], "Blue Dog Brewing");

    let (status, body) = request(
      &app,
      "PUT",
      "/settings/brewery",
      Some(json!({"name": "Hilltop Ales"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Hilltop Ales");

    let (status, _) =
      request(&app, "PUT", "/settings/brewery", Some(json!({"name": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Stats ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_reports_a_completed_interval() {
    let app = make_router(vec![batch("b1", "IPA v4", "IPA")]).await;
    request(&app, "POST", "/batches/sync", None).await;
    request(&app, "POST", "/kegs", None).await;
    request(&app, "POST", "/people", Some(json!({"name": "Troy"}))).await;
    request(
      &app,
      "PUT",
      "/kegs/1",
      Some(json!({"batch_id": "b1", "location": "Troy"})),
    )
    .await;
    request(&app, "POST", "/kegs/1/reset", None).await;

    let (status, report) = request(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let people = report["people"].as_array().unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0]["name"], "Troy");
    assert_eq!(people[0]["kegs_consumed"], 1);
    assert_eq!(people[0]["litres_consumed"], 19);
    assert_eq!(people[0]["top_styles"][0]["name"], "IPA");

    let overall = &report["overall"];
    assert_eq!(overall["total_kegs_consumed"], 1);
    assert_eq!(overall["total_litres"], 19);
    assert_eq!(overall["total_filled"], 1);
    assert_eq!(overall["total_returned"], 1);
    assert_eq!(overall["monthly"].as_array().unwrap().len(), 1);

    // filled + assigned + returned
    assert_eq!(report["event_count"], 3);
  }

  #[tokio::test]
  async fn stats_on_an_empty_log_is_all_zeroes() {
    let app = make_router(vec![]).await;
    let (status, report) = request(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["people"].as_array().unwrap().len(), 0);
    assert_eq!(report["overall"]["total_litres"], 0);
    assert_eq!(report["event_count"], 0);
  }
}
