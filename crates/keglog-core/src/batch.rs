//! Batch — one brewing run's metadata, sourced from the external brewing
//! log. Owned by the sync process; upserted by external id, never deleted
//! here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synced batch as stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
  /// External id from the brewing-log API.
  pub id:            String,
  pub batch_no:      Option<i64>,
  pub name:          String,
  pub style:         String,
  pub abv:           Option<f64>,
  /// `YYYY-MM-DD`, or the raw source value when it did not parse.
  pub brew_date:     String,
  pub bottling_date: String,
  pub status:        String,
  pub recipe_name:   String,
  pub batch_notes:   String,
  pub last_synced:   DateTime<Utc>,
}

/// Batch fields as mapped from one raw external record; `last_synced` is
/// stamped by the store on upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
  pub id:            String,
  pub batch_no:      Option<i64>,
  pub name:          String,
  pub style:         String,
  pub abv:           Option<f64>,
  pub brew_date:     String,
  pub bottling_date: String,
  pub status:        String,
  pub recipe_name:   String,
  pub batch_notes:   String,
}

/// The subset of batch fields nested into keg reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
  pub id:            String,
  pub batch_no:      Option<i64>,
  pub name:          String,
  pub style:         String,
  pub abv:           Option<f64>,
  pub recipe_name:   String,
  pub bottling_date: String,
  pub batch_notes:   String,
}

impl Batch {
  /// The name shown on event snapshots: the recipe name when present,
  /// otherwise the batch's own name.
  pub fn display_name(&self) -> &str {
    if self.recipe_name.is_empty() {
      &self.name
    } else {
      &self.recipe_name
    }
  }

  pub fn summary(&self) -> BatchSummary {
    BatchSummary {
      id:            self.id.clone(),
      batch_no:      self.batch_no,
      name:          self.name.clone(),
      style:         self.style.clone(),
      abv:           self.abv,
      recipe_name:   self.recipe_name.clone(),
      bottling_date: self.bottling_date.clone(),
      batch_notes:   self.batch_notes.clone(),
    }
  }
}
