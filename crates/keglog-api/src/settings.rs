//! Handlers for `/settings/brewery`.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;

use keglog_core::store::{BatchSource, KegStore};

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

#[derive(Debug, Deserialize)]
pub struct BreweryBody {
  pub name: String,
}

/// `GET /settings/brewery`
pub async fn get_brewery<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let name = state.store.brewery_name().await.map_err(store_err)?;
  Ok(Json(json!({ "name": name })))
}

/// `PUT /settings/brewery` — body: `{"name":"…"}`
pub async fn update_brewery<S, B>(
  State(state): State<ApiState<S, B>>,
  Json(body): Json<BreweryBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let name = state
    .store
    .set_brewery_name(&body.name)
    .await
    .map_err(store_err)?;
  Ok(Json(json!({ "name": name })))
}
