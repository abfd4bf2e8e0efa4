//! Mapping from raw Brewfather batch records to local batch fields.

use chrono::DateTime;
use serde::Deserialize;

use keglog_core::batch::NewBatch;

/// One batch record as Brewfather returns it, limited to the fields the
/// include list requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBatchRecord {
  #[serde(rename = "_id", default)]
  pub id:            String,
  #[serde(rename = "batchNo")]
  pub batch_no:      Option<i64>,
  #[serde(default)]
  pub name:          String,
  pub recipe:        Option<RawRecipe>,
  #[serde(rename = "measuredAbv")]
  pub measured_abv:  Option<f64>,
  /// Millisecond epoch.
  #[serde(rename = "brewDate")]
  pub brew_date:     Option<i64>,
  /// Millisecond epoch.
  #[serde(rename = "bottlingDate")]
  pub bottling_date: Option<i64>,
  #[serde(default)]
  pub status:        String,
  pub note:          Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecipe {
  #[serde(default)]
  pub name:  String,
  pub style: Option<RawStyle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStyle {
  #[serde(default)]
  pub name: String,
}

/// Format a millisecond epoch as `YYYY-MM-DD`. Absent or zero dates become
/// empty; out-of-range values fall back to the raw number as a string.
pub fn format_epoch_ms(ms: Option<i64>) -> String {
  let Some(ms) = ms.filter(|&ms| ms != 0) else {
    return String::new();
  };
  match DateTime::from_timestamp_millis(ms) {
    Some(dt) => dt.format("%Y-%m-%d").to_string(),
    None => ms.to_string(),
  }
}

/// Map one raw record into the local batch shape.
pub fn map_record(raw: RawBatchRecord) -> NewBatch {
  let (recipe_name, style) = match raw.recipe {
    Some(recipe) => (
      recipe.name,
      recipe.style.map(|s| s.name).unwrap_or_default(),
    ),
    None => (String::new(), String::new()),
  };

  NewBatch {
    id:            raw.id,
    batch_no:      raw.batch_no,
    name:          raw.name,
    style,
    abv:           raw.measured_abv,
    brew_date:     format_epoch_ms(raw.brew_date),
    bottling_date: format_epoch_ms(raw.bottling_date),
    status:        raw.status,
    recipe_name,
    batch_notes:   raw.note.unwrap_or_default(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_a_full_record() {
    let raw: RawBatchRecord = serde_json::from_str(
      r#"{
        "_id": "abc123",
        "batchNo": 7,
        "name": "Batch 7",
        "status": "Conditioning",
        "measuredAbv": 6.4,
        "brewDate": 1704067200000,
        "bottlingDate": 1705276800000,
        "note": "dry hopped twice",
        "recipe": { "name": "West Coast IPA", "style": { "name": "IPA" } }
      }"#,
    )
    .unwrap();

    let batch = map_record(raw);
    assert_eq!(batch.id, "abc123");
    assert_eq!(batch.batch_no, Some(7));
    assert_eq!(batch.recipe_name, "West Coast IPA");
    assert_eq!(batch.style, "IPA");
    assert_eq!(batch.abv, Some(6.4));
    assert_eq!(batch.brew_date, "2024-01-01");
    assert_eq!(batch.bottling_date, "2024-01-15");
    assert_eq!(batch.batch_notes, "dry hopped twice");
  }

  #[test]
  fn tolerates_a_minimal_record() {
    let raw: RawBatchRecord =
      serde_json::from_str(r#"{ "_id": "x" }"#).unwrap();
    let batch = map_record(raw);
    assert_eq!(batch.id, "x");
    assert!(batch.recipe_name.is_empty());
    assert!(batch.style.is_empty());
    assert!(batch.brew_date.is_empty());
    assert_eq!(batch.abv, None);
  }

  #[test]
  fn absent_or_zero_dates_are_empty() {
    assert_eq!(format_epoch_ms(None), "");
    assert_eq!(format_epoch_ms(Some(0)), "");
  }

  #[test]
  fn unparseable_dates_fall_back_to_the_raw_value() {
    // Far outside chrono's representable range.
    assert_eq!(format_epoch_ms(Some(i64::MAX)), i64::MAX.to_string());
  }

  #[test]
  fn epoch_formats_as_calendar_date() {
    // 2024-06-15T12:00:00Z
    assert_eq!(format_epoch_ms(Some(1_718_452_800_000)), "2024-06-15");
  }
}
