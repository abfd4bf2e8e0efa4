//! Handlers for `/batches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/batches` | All synced batches, newest brew first |
//! | `POST` | `/batches/sync` | Pulls from the external source; 502 on fetch failure |

use axum::{Json, extract::State};
use serde_json::json;

use keglog_core::{
  batch::Batch,
  store::{BatchSource, KegStore},
};

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

/// `GET /batches`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<Vec<Batch>>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let batches = state.store.list_batches().await.map_err(store_err)?;
  Ok(Json(batches))
}

/// `POST /batches/sync` — fetch from the external source and upsert.
///
/// The fetch either succeeds in full or fails as one gateway error; no
/// partial page is committed.
pub async fn sync<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let records = state
    .batches
    .fetch_batches()
    .await
    .map_err(|e| ApiError::Gateway(format!("batch sync failed: {e}")))?;
  let synced = state
    .store
    .upsert_batches(records)
    .await
    .map_err(store_err)?;
  Ok(Json(json!({ "synced": synced })))
}
