//! Handlers for `/kegs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/kegs` | All kegs with nested batch summaries |
//! | `POST`   | `/kegs` | Creates an empty keg, auto-labelled |
//! | `PUT`    | `/kegs/:id` | PATCH-style partial update; emits lifecycle events |
//! | `DELETE` | `/kegs/:id` | 409 while a batch is assigned |
//! | `POST`   | `/kegs/:id/reset` | Logs `returned` if warranted, then clears |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;

use keglog_core::{
  keg::{KegPatch, KegWithBatch},
  store::{BatchSource, KegStore},
};

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

/// `GET /kegs`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<Vec<KegWithBatch>>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let kegs = state.store.list_kegs().await.map_err(store_err)?;
  Ok(Json(kegs))
}

/// `POST /kegs`
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let keg = state.store.create_keg().await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(keg)))
}

/// `PUT /kegs/:id` — body: [`KegPatch`]
pub async fn update<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<i64>,
  Json(patch): Json<KegPatch>,
) -> Result<Json<KegWithBatch>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let keg = state.store.update_keg(id, patch).await.map_err(store_err)?;
  Ok(Json(keg))
}

/// `POST /kegs/:id/reset`
pub async fn reset<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<i64>,
) -> Result<Json<KegWithBatch>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let keg = state.store.reset_keg(id).await.map_err(store_err)?;
  Ok(Json(keg))
}

/// `DELETE /kegs/:id`
pub async fn remove<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  state.store.delete_keg(id).await.map_err(store_err)?;
  Ok(Json(json!({ "ok": true })))
}
