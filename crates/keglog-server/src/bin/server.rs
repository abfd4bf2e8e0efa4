//! keglog server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, seeds the keg fleet on first start, and serves
//! the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use keglog_brewfather::{BrewfatherClient, BrewfatherConfig};
use keglog_core::store::KegStore as _;
use keglog_server::ServerConfig;
use keglog_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "keglog keg tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("KEGLOG"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // First-start seeding; a no-op once any keg exists.
  let seeded = store
    .seed_kegs(server_cfg.seed_kegs)
    .await
    .context("failed to seed kegs")?;
  if seeded > 0 {
    tracing::info!("seeded {seeded} kegs into an empty store");
  }

  // Brewfather client for on-demand batch sync.
  let brewfather = BrewfatherClient::new(BrewfatherConfig {
    base_url: server_cfg.brewfather_base_url.clone(),
    user_id:  server_cfg.brewfather_user_id.clone(),
    api_key:  server_cfg.brewfather_api_key.clone(),
  })
  .context("failed to build Brewfather client")?;

  let app = keglog_server::router(Arc::new(store), Arc::new(brewfather));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
