//! Keg — the physical container tracked through the fill/assign/tap/return
//! cycle.
//!
//! A keg row holds only current state. History lives in the event log
//! ([`crate::lifecycle`]); statistics are derived from there, never from the
//! keg rows themselves.

use serde::{Deserialize, Serialize};

use crate::batch::BatchSummary;

/// Where a keg is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KegStatus {
  Empty,
  Full,
  OnTap,
}

impl Default for KegStatus {
  fn default() -> Self { KegStatus::Empty }
}

/// Current state of one keg.
///
/// `location` is free text: it may name a person (which makes the keg
/// "assigned" for statistics purposes) or a physical place. The distinction
/// is made by membership in the People set, not by the field itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keg {
  pub id:             i64,
  pub label:          String,
  pub status:         KegStatus,
  pub location:       String,
  pub batch_id:       Option<String>,
  pub date_purchased: String,
  pub notes:          String,
}

/// A keg joined with a summary of its assigned batch, as returned by reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KegWithBatch {
  #[serde(flatten)]
  pub keg:   Keg,
  pub batch: Option<BatchSummary>,
}

/// A partial update to a keg. Fields left as `None` are untouched.
///
/// `clear_batch` takes precedence over a supplied `batch_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KegPatch {
  pub label:          Option<String>,
  pub status:         Option<KegStatus>,
  pub location:       Option<String>,
  pub batch_id:       Option<String>,
  pub date_purchased: Option<String>,
  pub notes:          Option<String>,
  #[serde(default)]
  pub clear_batch:    bool,
}

impl Keg {
  /// Merge `patch` into this keg, PATCH-style. Pure; persistence and event
  /// derivation happen elsewhere.
  pub fn apply(&self, patch: &KegPatch) -> Keg {
    let mut next = self.clone();
    if let Some(label) = &patch.label {
      next.label = label.clone();
    }
    if let Some(status) = patch.status {
      next.status = status;
    }
    if let Some(location) = &patch.location {
      next.location = location.clone();
    }
    if patch.clear_batch {
      next.batch_id = None;
    } else if let Some(batch_id) = &patch.batch_id {
      next.batch_id = Some(batch_id.clone());
    }
    if let Some(date) = &patch.date_purchased {
      next.date_purchased = date.clone();
    }
    if let Some(notes) = &patch.notes {
      next.notes = notes.clone();
    }
    next
  }

  /// The post-reset state: everything cleared except identity and label.
  pub fn cleared(&self) -> Keg {
    Keg {
      id:             self.id,
      label:          self.label.clone(),
      status:         KegStatus::Empty,
      location:       String::new(),
      batch_id:       None,
      date_purchased: String::new(),
      notes:          String::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn keg() -> Keg {
    Keg {
      id:             1,
      label:          "Keg #1".into(),
      status:         KegStatus::Full,
      location:       "Cold room".into(),
      batch_id:       Some("b1".into()),
      date_purchased: "2024-01-01".into(),
      notes:          "dent on rim".into(),
    }
  }

  #[test]
  fn apply_merges_only_supplied_fields() {
    let patch = KegPatch {
      location: Some("Troy".into()),
      ..Default::default()
    };
    let next = keg().apply(&patch);
    assert_eq!(next.location, "Troy");
    assert_eq!(next.label, "Keg #1");
    assert_eq!(next.batch_id.as_deref(), Some("b1"));
    assert_eq!(next.status, KegStatus::Full);
  }

  #[test]
  fn clear_batch_wins_over_supplied_batch_id() {
    let patch = KegPatch {
      batch_id: Some("b2".into()),
      clear_batch: true,
      ..Default::default()
    };
    let next = keg().apply(&patch);
    assert_eq!(next.batch_id, None);
  }

  #[test]
  fn cleared_empties_everything_but_identity() {
    let next = keg().cleared();
    assert_eq!(next.id, 1);
    assert_eq!(next.label, "Keg #1");
    assert_eq!(next.status, KegStatus::Empty);
    assert_eq!(next.batch_id, None);
    assert!(next.location.is_empty());
    assert!(next.date_purchased.is_empty());
    assert!(next.notes.is_empty());
  }
}
