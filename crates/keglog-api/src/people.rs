//! Handlers for `/people` and `/locations` endpoints.
//!
//! The two registries share one name namespace — create fails with 409 when
//! the name exists on either side.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use keglog_core::{
  roster::{Location, Person},
  store::{BatchSource, KegStore},
};

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

#[derive(Debug, Deserialize)]
pub struct NameBody {
  pub name: String,
}

// ─── People ──────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list_people<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let people = state.store.list_people().await.map_err(store_err)?;
  Ok(Json(people))
}

/// `POST /people` — body: `{"name":"Troy"}`
pub async fn create_person<S, B>(
  State(state): State<ApiState<S, B>>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let person = state.store.add_person(&body.name).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `DELETE /people/:id`
pub async fn delete_person<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  state.store.remove_person(id).await.map_err(store_err)?;
  Ok(Json(json!({ "ok": true })))
}

// ─── Locations ───────────────────────────────────────────────────────────────

/// `GET /locations`
pub async fn list_locations<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<Vec<Location>>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let locations = state.store.list_locations().await.map_err(store_err)?;
  Ok(Json(locations))
}

/// `POST /locations` — body: `{"name":"Garage"}`
pub async fn create_location<S, B>(
  State(state): State<ApiState<S, B>>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let location = state
    .store
    .add_location(&body.name)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(location)))
}

/// `DELETE /locations/:id`
pub async fn delete_location<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  state.store.remove_location(id).await.map_err(store_err)?;
  Ok(Json(json!({ "ok": true })))
}
