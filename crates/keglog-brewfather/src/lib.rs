//! Brewfather sync adapter — the external batch-metadata source.
//!
//! Pulls paginated batch records from the Brewfather API, deduplicates them
//! by external id, and maps them to [`keglog_core::batch::NewBatch`] records
//! for the store to upsert. Fetch failures surface as one error to the
//! caller; a short or empty page is a normal termination signal, not an
//! error.

pub mod map;

use std::{collections::HashSet, time::Duration};

use reqwest::Client;
use thiserror::Error;

use keglog_core::{batch::NewBatch, store::BatchSource};

use map::RawBatchRecord;

pub const DEFAULT_BASE_URL: &str = "https://api.brewfather.app/v2";

/// Records fetched per page.
const PAGE_SIZE: usize = 50;
/// Hard safety cap on pages per sync (at most 1000 batches).
const MAX_PAGES: usize = 20;

/// Fields requested beyond the API's slim default batch shape.
const INCLUDE_FIELDS: &str =
  "recipe.name,recipe.style.name,measuredAbv,batchNo,bottlingDate,note";

#[derive(Debug, Error)]
pub enum Error {
  #[error("brewing-log request failed: {0}")]
  Http(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Connection settings for the Brewfather API.
#[derive(Debug, Clone)]
pub struct BrewfatherConfig {
  pub base_url: String,
  pub user_id:  String,
  pub api_key:  String,
}

impl BrewfatherConfig {
  pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      user_id:  user_id.into(),
      api_key:  api_key.into(),
    }
  }
}

/// Async client for the Brewfather batches endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct BrewfatherClient {
  client: Client,
  config: BrewfatherConfig,
}

impl BrewfatherClient {
  pub fn new(config: BrewfatherConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  /// Fetch all batch records, paginating until a page comes back empty,
  /// short, or fully duplicated — or the page cap is reached.
  pub async fn fetch_raw(&self) -> Result<Vec<RawBatchRecord>> {
    if self.config.user_id.is_empty() || self.config.api_key.is_empty() {
      tracing::warn!("brewfather credentials are empty; sync will likely 401");
    }

    let mut records: Vec<RawBatchRecord> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut offset = 0usize;

    for _ in 0..MAX_PAGES {
      tracing::debug!(offset, limit = PAGE_SIZE, "requesting batch page");
      let page: Vec<RawBatchRecord> = self
        .client
        .get(format!("{}/batches", self.config.base_url))
        .basic_auth(&self.config.user_id, Some(&self.config.api_key))
        .query(&[
          ("limit", PAGE_SIZE.to_string()),
          ("offset", offset.to_string()),
          ("status", "Conditioning".to_string()),
          ("include", INCLUDE_FIELDS.to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

      if page.is_empty() {
        break;
      }

      let page_len = page.len();
      let mut new_count = 0usize;
      for record in page {
        if seen_ids.insert(record.id.clone()) {
          records.push(record);
          new_count += 1;
        }
      }
      tracing::debug!(got = page_len, new = new_count, "batch page received");

      // A fully-duplicated or short page means the source is exhausted.
      if new_count == 0 || page_len < PAGE_SIZE {
        break;
      }
      offset += PAGE_SIZE;
    }

    tracing::info!(total = records.len(), "fetched unique batches");
    Ok(records)
  }
}

impl BatchSource for BrewfatherClient {
  type Error = Error;

  async fn fetch_batches(&self) -> Result<Vec<NewBatch>> {
    let raw = self.fetch_raw().await?;
    Ok(raw.into_iter().map(map::map_record).collect())
  }
}
