//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; status and event-type
//! enums as their snake_case wire names.

use chrono::{DateTime, Utc};
use keglog_core::{
  keg::{Keg, KegStatus},
  lifecycle::{EventType, KegEvent},
};

use crate::{Error, Result};

// ─── KegStatus ───────────────────────────────────────────────────────────────

pub fn encode_status(s: KegStatus) -> &'static str {
  match s {
    KegStatus::Empty => "empty",
    KegStatus::Full => "full",
    KegStatus::OnTap => "on_tap",
  }
}

pub fn decode_status(s: &str) -> Result<KegStatus> {
  match s {
    "empty" => Ok(KegStatus::Empty),
    "full" => Ok(KegStatus::Full),
    "on_tap" => Ok(KegStatus::OnTap),
    other => Err(Error::Decode(format!("unknown keg status: {other:?}"))),
  }
}

// ─── EventType ───────────────────────────────────────────────────────────────

pub fn encode_event_type(t: EventType) -> &'static str {
  match t {
    EventType::Filled => "filled",
    EventType::Assigned => "assigned",
    EventType::Tapped => "tapped",
    EventType::Returned => "returned",
    EventType::Deleted => "deleted",
  }
}

pub fn decode_event_type(s: &str) -> Result<EventType> {
  match s {
    "filled" => Ok(EventType::Filled),
    "assigned" => Ok(EventType::Assigned),
    "tapped" => Ok(EventType::Tapped),
    "returned" => Ok(EventType::Returned),
    "deleted" => Ok(EventType::Deleted),
    other => Err(Error::Decode(format!("unknown event type: {other:?}"))),
  }
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A keg row as read from SQLite, before decoding.
pub struct RawKeg {
  pub keg_id:         i64,
  pub label:          String,
  pub status:         String,
  pub location:       String,
  pub batch_id:       Option<String>,
  pub date_purchased: String,
  pub notes:          String,
}

impl RawKeg {
  pub fn into_keg(self) -> Result<Keg> {
    Ok(Keg {
      id:             self.keg_id,
      label:          self.label,
      status:         decode_status(&self.status)?,
      location:       self.location,
      batch_id:       self.batch_id,
      date_purchased: self.date_purchased,
      notes:          self.notes,
    })
  }
}

/// A batch row as read from SQLite, before decoding.
pub struct RawBatch {
  pub batch_id:      String,
  pub batch_no:      Option<i64>,
  pub name:          String,
  pub style:         String,
  pub abv:           Option<f64>,
  pub brew_date:     String,
  pub bottling_date: String,
  pub status:        String,
  pub recipe_name:   String,
  pub batch_notes:   String,
  pub last_synced:   String,
}

impl RawBatch {
  pub fn into_batch(self) -> Result<keglog_core::batch::Batch> {
    Ok(keglog_core::batch::Batch {
      id:            self.batch_id,
      batch_no:      self.batch_no,
      name:          self.name,
      style:         self.style,
      abv:           self.abv,
      brew_date:     self.brew_date,
      bottling_date: self.bottling_date,
      status:        self.status,
      recipe_name:   self.recipe_name,
      batch_notes:   self.batch_notes,
      last_synced:   decode_dt(&self.last_synced)?,
    })
  }
}

/// An event row as read from SQLite, before decoding.
pub struct RawEvent {
  pub event_id:   i64,
  pub keg_id:     i64,
  pub event_type: String,
  pub person:     String,
  pub batch_id:   Option<String>,
  pub batch_name: String,
  pub style:      String,
  pub timestamp:  String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<KegEvent> {
    Ok(KegEvent {
      id:         self.event_id,
      keg_id:     self.keg_id,
      event_type: decode_event_type(&self.event_type)?,
      person:     self.person,
      batch_id:   self.batch_id,
      batch_name: self.batch_name,
      style:      self.style,
      timestamp:  decode_dt(&self.timestamp)?,
    })
  }
}

/// Lift a decode failure into a [`rusqlite::Error`] for use inside
/// connection closures, where only SQL errors can propagate.
pub fn as_sql_error(e: Error) -> rusqlite::Error {
  rusqlite::Error::FromSqlConversionFailure(
    0,
    rusqlite::types::Type::Text,
    Box::new(e),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_round_trips() {
    for s in [KegStatus::Empty, KegStatus::Full, KegStatus::OnTap] {
      assert_eq!(decode_status(encode_status(s)).unwrap(), s);
    }
  }

  #[test]
  fn unknown_status_is_a_decode_error() {
    assert!(decode_status("cracked").is_err());
  }

  #[test]
  fn event_type_round_trips() {
    for t in [
      EventType::Filled,
      EventType::Assigned,
      EventType::Tapped,
      EventType::Returned,
      EventType::Deleted,
    ] {
      assert_eq!(decode_event_type(encode_event_type(t)).unwrap(), t);
    }
  }
}
