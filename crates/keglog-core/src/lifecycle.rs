//! Lifecycle events and the state-transition diff that emits them.
//!
//! Events are never requested by a caller; they are derived by comparing a
//! keg's state before and after a mutation. That keeps the history a
//! faithful side effect of state changes and the statistics engine decoupled
//! from keg CRUD. The diff itself is pure so it can be tested without a
//! store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keg::{Keg, KegStatus};

// ─── Event records ───────────────────────────────────────────────────────────

/// The kinds of lifecycle transition recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
  Filled,
  Assigned,
  Tapped,
  Returned,
  Deleted,
}

/// One persisted, immutable event-log entry.
///
/// `batch_name` and `style` are snapshots taken at emission time so later
/// batch edits never rewrite history. Ordering is by `timestamp`, ties
/// broken by `id` (insertion order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KegEvent {
  pub id:         i64,
  pub keg_id:     i64,
  pub event_type: EventType,
  pub person:     String,
  pub batch_id:   Option<String>,
  pub batch_name: String,
  pub style:      String,
  pub timestamp:  DateTime<Utc>,
}

/// An event intent produced by the transition diff, not yet persisted.
/// The store assigns `id` and `timestamp` when it appends the event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
  pub keg_id:     i64,
  pub event_type: EventType,
  pub person:     String,
  pub batch_id:   Option<String>,
  pub batch_name: String,
  pub style:      String,
}

impl EventDraft {
  /// The tombstone appended when a keg row is removed. The event outlives
  /// the keg.
  pub fn deleted(keg_id: i64) -> EventDraft {
    EventDraft {
      keg_id,
      event_type: EventType::Deleted,
      person:     String::new(),
      batch_id:   None,
      batch_name: String::new(),
      style:      String::new(),
    }
  }
}

// ─── Transition context ──────────────────────────────────────────────────────

/// Denormalized batch fields snapshotted onto emitted events; empty when the
/// keg has no batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSnapshot {
  pub batch_name: String,
  pub style:      String,
}

/// Facts the diff needs from outside the keg row itself.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
  /// Whether the keg's (post-merge) location names a recognized person.
  /// Membership is checked against the mutable People set, never a
  /// hardcoded list.
  pub location_is_person: bool,
  /// Snapshot of the (post-merge) batch, or empty if none is assigned.
  pub batch:              BatchSnapshot,
}

// ─── Transition diff ─────────────────────────────────────────────────────────

/// Compare a keg before and after an update and return the events the
/// transition emits, in fixed order, each at most once:
///
/// 1. `filled` — the batch reference changed to a different non-null value.
/// 2. `assigned` — the new location is a recognized person and differs from
///    the old location.
/// 3. `tapped` — status moved into `on_tap` from anything else.
pub fn update_events(old: &Keg, new: &Keg, ctx: &TransitionContext) -> Vec<EventDraft> {
  let mut events = Vec::new();

  if new.batch_id.is_some() && new.batch_id != old.batch_id {
    events.push(EventDraft {
      keg_id:     new.id,
      event_type: EventType::Filled,
      person:     String::new(),
      batch_id:   new.batch_id.clone(),
      batch_name: ctx.batch.batch_name.clone(),
      style:      ctx.batch.style.clone(),
    });
  }

  if ctx.location_is_person && new.location != old.location {
    events.push(EventDraft {
      keg_id:     new.id,
      event_type: EventType::Assigned,
      person:     new.location.clone(),
      batch_id:   new.batch_id.clone(),
      batch_name: ctx.batch.batch_name.clone(),
      style:      ctx.batch.style.clone(),
    });
  }

  if new.status == KegStatus::OnTap && old.status != KegStatus::OnTap {
    events.push(EventDraft {
      keg_id:     new.id,
      event_type: EventType::Tapped,
      person:     new.location.clone(),
      batch_id:   new.batch_id.clone(),
      batch_name: ctx.batch.batch_name.clone(),
      style:      ctx.batch.style.clone(),
    });
  }

  events
}

/// The event a reset emits before clearing the keg, if any.
///
/// A `returned` fires when the keg is out with a person or holds a batch.
/// Person-only assignments (no batch) still return, with empty batch
/// snapshot fields; the person is empty when the location is not a
/// recognized person.
pub fn reset_event(
  keg: &Keg,
  location_is_person: bool,
  batch: &BatchSnapshot,
) -> Option<EventDraft> {
  let person = if location_is_person {
    keg.location.clone()
  } else {
    String::new()
  };

  if person.is_empty() && keg.batch_id.is_none() {
    return None;
  }

  Some(EventDraft {
    keg_id:     keg.id,
    event_type: EventType::Returned,
    person,
    batch_id:   keg.batch_id.clone(),
    batch_name: batch.batch_name.clone(),
    style:      batch.style.clone(),
  })
}
