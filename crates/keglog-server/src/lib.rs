//! keglog HTTP server: configuration and top-level router assembly.
//!
//! The JSON API itself lives in `keglog-api`; this crate only knows how to
//! read a config file, open the store, construct the Brewfather client and
//! serve the result.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use keglog_brewfather::{BrewfatherClient, DEFAULT_BASE_URL};
use keglog_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("keglog.db") }
fn default_seed_kegs() -> u32 { 16 }
fn default_brewfather_base_url() -> String { DEFAULT_BASE_URL.to_string() }

/// Server configuration, deserialised from `config.toml` and `KEGLOG_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// How many kegs to create on first start against an empty store.
  #[serde(default = "default_seed_kegs")]
  pub seed_kegs:           u32,
  pub brewfather_user_id:  String,
  pub brewfather_api_key:  String,
  #[serde(default = "default_brewfather_base_url")]
  pub brewfather_base_url: String,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router: `/health` plus the JSON API under
/// `/api`, with request tracing.
pub fn router(
  store: Arc<SqliteStore>,
  brewfather: Arc<BrewfatherClient>,
) -> Router {
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", keglog_api::api_router(store, brewfather))
    .layer(TraceLayer::new_for_http())
}
