//! Handlers for `/stats` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/stats` | Full derived statistics snapshot |
//! | `GET` | `/stats/events` | Latest 50 events, newest first |

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use keglog_core::{
  lifecycle::{EventType, KegEvent},
  stats::{self, StatsReport},
  store::{BatchSource, KegStore},
};

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

/// How many events the feed endpoint returns.
const EVENT_FEED_LIMIT: u32 = 50;

/// `GET /stats` — replays the full event log into a fresh report.
pub async fn report<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<StatsReport>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let events = state.store.all_events().await.map_err(store_err)?;
  Ok(Json(stats::derive(&events)))
}

/// An event as exposed on the feed; the batch id stays internal.
#[derive(Debug, Serialize)]
pub struct EventView {
  pub id:         i64,
  pub keg_id:     i64,
  pub event_type: EventType,
  pub person:     String,
  pub batch_name: String,
  pub style:      String,
  pub timestamp:  DateTime<Utc>,
}

impl From<KegEvent> for EventView {
  fn from(e: KegEvent) -> Self {
    EventView {
      id:         e.id,
      keg_id:     e.keg_id,
      event_type: e.event_type,
      person:     e.person,
      batch_name: e.batch_name,
      style:      e.style,
      timestamp:  e.timestamp,
    }
  }
}

/// `GET /stats/events`
pub async fn events<S, B>(
  State(state): State<ApiState<S, B>>,
) -> Result<Json<Vec<EventView>>, ApiError>
where
  S: KegStore,
  B: BatchSource,
{
  let events = state
    .store
    .recent_events(EVENT_FEED_LIMIT)
    .await
    .map_err(store_err)?;
  Ok(Json(events.into_iter().map(EventView::from).collect()))
}
