//! Consumption statistics derived from the event log.
//!
//! The engine is a pure read-side consumer: it replays the full event log
//! (ordered by timestamp, ties by id), pairs `assigned`/`returned` events
//! into completed assignment intervals, and aggregates per person and
//! overall. It never errors — unmatched or malformed sequences degrade to
//! zero/empty values.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  KEG_LITRES,
  lifecycle::{EventType, KegEvent},
};

// ─── Report types ────────────────────────────────────────────────────────────

/// One closed assignment: a keg went out to a person and came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedInterval {
  pub person:      String,
  pub batch_name:  String,
  pub style:       String,
  /// Days between assignment and return, one decimal.
  pub days:        f64,
  pub assigned_at: DateTime<Utc>,
  pub returned_at: DateTime<Utc>,
}

/// A name with an occurrence count, for top-N lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
  pub name:  String,
  pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonStats {
  pub name:             String,
  pub kegs_consumed:    u32,
  pub litres_consumed:  u32,
  pub avg_days_per_keg: f64,
  pub litres_per_month: f64,
  pub top_styles:       Vec<NamedCount>,
  pub top_batches:      Vec<NamedCount>,
  /// The most recent 10 completed intervals, oldest first.
  pub history:          Vec<CompletedInterval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
  /// Calendar month of the return, `YYYY-MM`.
  pub month: String,
  pub kegs:  u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallStats {
  pub total_kegs_consumed: u32,
  pub total_litres:        u32,
  pub total_filled:        u32,
  pub total_returned:      u32,
  pub monthly:             Vec<MonthlyCount>,
  pub popular_styles:      Vec<NamedCount>,
}

/// The full statistics snapshot, recomputed from scratch on each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
  pub people:      Vec<PersonStats>,
  pub overall:     OverallStats,
  pub event_count: usize,
}

// ─── Interval reconstruction ─────────────────────────────────────────────────

struct OpenAssignment {
  person:      String,
  batch_name:  String,
  style:       String,
  assigned_at: DateTime<Utc>,
}

fn round1(x: f64) -> f64 { (x * 10.0).round() / 10.0 }

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
  (to - from).num_seconds() as f64 / 86_400.0
}

/// Replay the log into completed intervals.
///
/// An `assigned` event with a person opens (or overwrites) the keg's open
/// assignment. A `returned` event closes it; a return with no matching open
/// assignment but a person on the event still counts, as a zero-day interval
/// anchored at the return timestamp.
pub fn completed_intervals(events: &[KegEvent]) -> Vec<CompletedInterval> {
  let mut open: HashMap<i64, OpenAssignment> = HashMap::new();
  let mut completed = Vec::new();

  for ev in events {
    match ev.event_type {
      EventType::Assigned if !ev.person.is_empty() => {
        open.insert(ev.keg_id, OpenAssignment {
          person:      ev.person.clone(),
          batch_name:  ev.batch_name.clone(),
          style:       ev.style.clone(),
          assigned_at: ev.timestamp,
        });
      }
      EventType::Returned => {
        if let Some(assignment) = open.remove(&ev.keg_id) {
          completed.push(CompletedInterval {
            person:      assignment.person,
            batch_name:  assignment.batch_name,
            style:       assignment.style,
            days:        round1(days_between(assignment.assigned_at, ev.timestamp)),
            assigned_at: assignment.assigned_at,
            returned_at: ev.timestamp,
          });
        } else if !ev.person.is_empty() {
          // Stray return: no matching assignment on record.
          completed.push(CompletedInterval {
            person:      ev.person.clone(),
            batch_name:  ev.batch_name.clone(),
            style:       ev.style.clone(),
            days:        0.0,
            assigned_at: ev.timestamp,
            returned_at: ev.timestamp,
          });
        }
      }
      _ => {}
    }
  }

  completed
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Increment `name` in an encounter-ordered count list.
fn bump(counts: &mut Vec<(String, u32)>, name: &str) {
  if let Some(entry) = counts.iter_mut().find(|(n, _)| n == name) {
    entry.1 += 1;
  } else {
    counts.push((name.to_owned(), 1));
  }
}

/// Top `n` by count; ties keep their original encounter order.
fn top_n(counts: &[(String, u32)], n: usize) -> Vec<NamedCount> {
  let mut sorted = counts.to_vec();
  sorted.sort_by(|a, b| b.1.cmp(&a.1));
  sorted
    .into_iter()
    .take(n)
    .map(|(name, count)| NamedCount { name, count })
    .collect()
}

#[derive(Default)]
struct PersonAcc {
  kegs:       u32,
  total_days: f64,
  styles:     Vec<(String, u32)>,
  batches:    Vec<(String, u32)>,
  history:    Vec<CompletedInterval>,
}

/// Derive the full statistics report from an event log ordered ascending by
/// (timestamp, id).
pub fn derive(events: &[KegEvent]) -> StatsReport {
  let completed = completed_intervals(events);

  // Group completed intervals by person; BTreeMap keeps the output sorted
  // by name.
  let mut per_person: BTreeMap<String, PersonAcc> = BTreeMap::new();
  for interval in &completed {
    if interval.person.is_empty() {
      continue;
    }
    let acc = per_person.entry(interval.person.clone()).or_default();
    acc.kegs += 1;
    acc.total_days += interval.days;
    if !interval.style.is_empty() {
      bump(&mut acc.styles, &interval.style);
    }
    if !interval.batch_name.is_empty() {
      bump(&mut acc.batches, &interval.batch_name);
    }
    acc.history.push(interval.clone());
  }

  let people: Vec<PersonStats> = per_person
    .into_iter()
    .map(|(name, acc)| {
      let litres = acc.kegs * KEG_LITRES;
      let avg_days = if acc.kegs > 0 {
        round1(acc.total_days / acc.kegs as f64)
      } else {
        0.0
      };

      // Consumption rate across the person's whole span, floored at one day
      // so a single same-day return does not divide by zero.
      let litres_per_month = match (acc.history.first(), acc.history.last()) {
        (Some(first), Some(last)) => {
          let span_days = days_between(first.assigned_at, last.returned_at).max(1.0);
          round1(litres as f64 / (span_days / 30.0))
        }
        _ => 0.0,
      };

      let top_styles = top_n(&acc.styles, 3);
      let top_batches = top_n(&acc.batches, 3);
      let history: Vec<CompletedInterval> = acc
        .history
        .iter()
        .rev()
        .take(10)
        .rev()
        .cloned()
        .collect();

      PersonStats {
        name,
        kegs_consumed: acc.kegs,
        litres_consumed: litres,
        avg_days_per_keg: avg_days,
        litres_per_month,
        top_styles,
        top_batches,
        history,
      }
    })
    .collect();

  // Overall aggregates.
  let total_kegs: u32 = people.iter().map(|p| p.kegs_consumed).sum();

  let total_filled = events
    .iter()
    .filter(|e| e.event_type == EventType::Filled)
    .count() as u32;
  let total_returned = events
    .iter()
    .filter(|e| e.event_type == EventType::Returned)
    .count() as u32;

  let mut monthly_map: BTreeMap<String, u32> = BTreeMap::new();
  for interval in &completed {
    let month = interval.returned_at.format("%Y-%m").to_string();
    *monthly_map.entry(month).or_insert(0) += 1;
  }
  let monthly = monthly_map
    .into_iter()
    .map(|(month, kegs)| MonthlyCount { month, kegs })
    .collect();

  let mut all_styles: Vec<(String, u32)> = Vec::new();
  for interval in &completed {
    if !interval.style.is_empty() {
      bump(&mut all_styles, &interval.style);
    }
  }
  let popular_styles = top_n(&all_styles, 5);

  StatsReport {
    people,
    overall: OverallStats {
      total_kegs_consumed: total_kegs,
      total_litres: total_kegs * KEG_LITRES,
      total_filled,
      total_returned,
      monthly,
      popular_styles,
    },
    event_count: events.len(),
  }
}
