//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use keglog_core::Error as CoreError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("upstream error: {0}")]
  Gateway(String),

  #[error("store error: {0}")]
  Store(String),
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::KegNotFound(_)
      | CoreError::BatchNotFound(_)
      | CoreError::PersonNotFound(_)
      | CoreError::LocationNotFound(_) => ApiError::NotFound(e.to_string()),
      CoreError::BatchAssigned(_) | CoreError::NameTaken { .. } => {
        ApiError::Conflict(e.to_string())
      }
      CoreError::EmptyName => ApiError::BadRequest(e.to_string()),
      CoreError::Storage(msg) => ApiError::Store(msg),
    }
  }
}

/// Map a store failure through the core taxonomy into an HTTP category.
pub fn store_err<E: Into<CoreError>>(e: E) -> ApiError { ApiError::from(e.into()) }

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Gateway(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
