//! [`SqliteStore`] — the SQLite implementation of [`KegStore`].
//!
//! Keg mutations (`update_keg`, `reset_keg`, `delete_keg`) each run inside
//! one transaction: read current state, merge, derive events via the pure
//! transition diff, append events, write state. That makes the sequence
//! atomic relative to concurrent mutations on the same keg.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use keglog_core::{
  Error as CoreError,
  batch::{Batch, BatchSummary, NewBatch},
  error::NameKind,
  keg::{Keg, KegPatch, KegWithBatch},
  lifecycle::{self, BatchSnapshot, EventDraft, KegEvent, TransitionContext},
  roster::{Location, Person, normalize_name},
  store::KegStore,
};

use crate::{
  Error, Result,
  encode::{
    RawBatch, RawEvent, RawKeg, as_sql_error, encode_dt, encode_event_type,
    encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A keglog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────
//
// Free functions over a plain connection so they can run inside both
// transactions and read-only closures.

fn load_keg(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Keg>> {
  let raw: Option<RawKeg> = conn
    .query_row(
      "SELECT keg_id, label, status, location, batch_id, date_purchased, notes
       FROM kegs WHERE keg_id = ?1",
      rusqlite::params![id],
      |row| {
        Ok(RawKeg {
          keg_id:         row.get(0)?,
          label:          row.get(1)?,
          status:         row.get(2)?,
          location:       row.get(3)?,
          batch_id:       row.get(4)?,
          date_purchased: row.get(5)?,
          notes:          row.get(6)?,
        })
      },
    )
    .optional()?;

  raw
    .map(|r| r.into_keg().map_err(as_sql_error))
    .transpose()
}

fn batch_summary(
  conn: &rusqlite::Connection,
  batch_id: &str,
) -> rusqlite::Result<Option<BatchSummary>> {
  conn
    .query_row(
      "SELECT batch_id, batch_no, name, style, abv, recipe_name,
              bottling_date, batch_notes
       FROM batches WHERE batch_id = ?1",
      rusqlite::params![batch_id],
      |row| {
        Ok(BatchSummary {
          id:            row.get(0)?,
          batch_no:      row.get(1)?,
          name:          row.get(2)?,
          style:         row.get(3)?,
          abv:           row.get(4)?,
          recipe_name:   row.get(5)?,
          bottling_date: row.get(6)?,
          batch_notes:   row.get(7)?,
        })
      },
    )
    .optional()
}

fn load_keg_with_batch(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<KegWithBatch>> {
  let Some(keg) = load_keg(conn, id)? else {
    return Ok(None);
  };
  let batch = match keg.batch_id.as_deref() {
    Some(batch_id) => batch_summary(conn, batch_id)?,
    None => None,
  };
  Ok(Some(KegWithBatch { keg, batch }))
}

/// Snapshot the batch fields that get denormalized onto events. A missing
/// or unknown batch snapshots as empty strings.
fn batch_snapshot(
  conn: &rusqlite::Connection,
  batch_id: Option<&str>,
) -> rusqlite::Result<BatchSnapshot> {
  let Some(batch_id) = batch_id else {
    return Ok(BatchSnapshot::default());
  };
  let row: Option<(String, String, String)> = conn
    .query_row(
      "SELECT recipe_name, name, style FROM batches WHERE batch_id = ?1",
      rusqlite::params![batch_id],
      |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .optional()?;

  Ok(match row {
    Some((recipe_name, name, style)) => BatchSnapshot {
      batch_name: if recipe_name.is_empty() { name } else { recipe_name },
      style,
    },
    None => BatchSnapshot::default(),
  })
}

/// Membership test against the mutable People set.
fn is_person(conn: &rusqlite::Connection, name: &str) -> rusqlite::Result<bool> {
  if name.is_empty() {
    return Ok(false);
  }
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM people WHERE name = ?1",
        rusqlite::params![name],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn location_name_exists(
  conn: &rusqlite::Connection,
  name: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM locations WHERE name = ?1",
        rusqlite::params![name],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn save_keg(conn: &rusqlite::Connection, keg: &Keg) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE kegs
     SET label = ?2, status = ?3, location = ?4, batch_id = ?5,
         date_purchased = ?6, notes = ?7
     WHERE keg_id = ?1",
    rusqlite::params![
      keg.id,
      keg.label,
      encode_status(keg.status),
      keg.location,
      keg.batch_id,
      keg.date_purchased,
      keg.notes,
    ],
  )?;
  Ok(())
}

fn append_event(
  conn: &rusqlite::Connection,
  draft: &EventDraft,
  timestamp: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO keg_events (keg_id, event_type, person, batch_id, batch_name, style, timestamp)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      draft.keg_id,
      encode_event_type(draft.event_type),
      draft.person,
      draft.batch_id,
      draft.batch_name,
      draft.style,
      timestamp,
    ],
  )?;
  Ok(())
}

fn ensure_settings_row(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT OR IGNORE INTO settings (settings_id) VALUES (1)",
    [],
  )?;
  Ok(())
}

// ─── KegStore impl ───────────────────────────────────────────────────────────

impl KegStore for SqliteStore {
  type Error = Error;

  // ── Kegs ──────────────────────────────────────────────────────────────────

  async fn list_kegs(&self) -> Result<Vec<KegWithBatch>> {
    let kegs = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT keg_id FROM kegs ORDER BY keg_id",
        )?;
        let ids = stmt
          .query_map([], |row| row.get::<_, i64>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut kegs = Vec::with_capacity(ids.len());
        for id in ids {
          if let Some(keg) = load_keg_with_batch(conn, id)? {
            kegs.push(keg);
          }
        }
        Ok(kegs)
      })
      .await?;
    Ok(kegs)
  }

  async fn get_keg(&self, id: i64) -> Result<Option<KegWithBatch>> {
    Ok(self.conn.call(move |conn| Ok(load_keg_with_batch(conn, id)?)).await?)
  }

  async fn create_keg(&self) -> Result<KegWithBatch> {
    let keg = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let max_id: i64 = tx.query_row(
          "SELECT COALESCE(MAX(keg_id), 0) FROM kegs",
          [],
          |row| row.get(0),
        )?;
        tx.execute(
          "INSERT INTO kegs (label, status) VALUES (?1, 'empty')",
          rusqlite::params![format!("Keg #{}", max_id + 1)],
        )?;
        let id = tx.last_insert_rowid();
        let keg = load_keg_with_batch(&tx, id)?;
        tx.commit()?;
        Ok(keg)
      })
      .await?;

    keg.ok_or_else(|| Error::Decode("created keg row vanished".into()))
  }

  async fn seed_kegs(&self, count: u32) -> Result<u32> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: i64 =
          tx.query_row("SELECT COUNT(*) FROM kegs", [], |row| row.get(0))?;
        if existing > 0 {
          return Ok(0);
        }
        for i in 1..=count {
          tx.execute(
            "INSERT INTO kegs (keg_id, label, status) VALUES (?1, ?2, 'empty')",
            rusqlite::params![i, format!("Keg #{i}")],
          )?;
        }
        tx.commit()?;
        Ok(count)
      })
      .await?;
    Ok(inserted)
  }

  async fn update_keg(&self, id: i64, patch: KegPatch) -> Result<KegWithBatch> {
    let out: Result<KegWithBatch, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(old) = load_keg(&tx, id)? else {
          return Ok(Err(CoreError::KegNotFound(id)));
        };
        let new = old.apply(&patch);

        let ctx = TransitionContext {
          location_is_person: is_person(&tx, &new.location)?,
          batch:              batch_snapshot(&tx, new.batch_id.as_deref())?,
        };

        let now = encode_dt(Utc::now());
        for draft in lifecycle::update_events(&old, &new, &ctx) {
          append_event(&tx, &draft, &now)?;
        }
        save_keg(&tx, &new)?;

        let Some(keg) = load_keg_with_batch(&tx, id)? else {
          return Ok(Err(CoreError::KegNotFound(id)));
        };
        tx.commit()?;
        Ok(Ok(keg))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  async fn reset_keg(&self, id: i64) -> Result<KegWithBatch> {
    let out: Result<KegWithBatch, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(keg) = load_keg(&tx, id)? else {
          return Ok(Err(CoreError::KegNotFound(id)));
        };

        // Log the return before anything is cleared.
        let location_is_person = is_person(&tx, &keg.location)?;
        let snapshot = batch_snapshot(&tx, keg.batch_id.as_deref())?;
        if let Some(draft) = lifecycle::reset_event(&keg, location_is_person, &snapshot)
        {
          append_event(&tx, &draft, &encode_dt(Utc::now()))?;
        }

        save_keg(&tx, &keg.cleared())?;

        let Some(keg) = load_keg_with_batch(&tx, id)? else {
          return Ok(Err(CoreError::KegNotFound(id)));
        };
        tx.commit()?;
        Ok(Ok(keg))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  async fn delete_keg(&self, id: i64) -> Result<()> {
    let out: Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let Some(keg) = load_keg(&tx, id)? else {
          return Ok(Err(CoreError::KegNotFound(id)));
        };
        if keg.batch_id.is_some() {
          return Ok(Err(CoreError::BatchAssigned(id)));
        }

        append_event(&tx, &EventDraft::deleted(id), &encode_dt(Utc::now()))?;
        tx.execute("DELETE FROM kegs WHERE keg_id = ?1", rusqlite::params![id])?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  // ── Batches ───────────────────────────────────────────────────────────────

  async fn list_batches(&self) -> Result<Vec<Batch>> {
    let raws: Vec<RawBatch> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT batch_id, batch_no, name, style, abv, brew_date,
                  bottling_date, status, recipe_name, batch_notes, last_synced
           FROM batches ORDER BY brew_date DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawBatch {
              batch_id:      row.get(0)?,
              batch_no:      row.get(1)?,
              name:          row.get(2)?,
              style:         row.get(3)?,
              abv:           row.get(4)?,
              brew_date:     row.get(5)?,
              bottling_date: row.get(6)?,
              status:        row.get(7)?,
              recipe_name:   row.get(8)?,
              batch_notes:   row.get(9)?,
              last_synced:   row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBatch::into_batch).collect()
  }

  async fn upsert_batches(&self, batches: Vec<NewBatch>) -> Result<u32> {
    let now = encode_dt(Utc::now());
    let count = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut count = 0u32;
        for b in &batches {
          tx.execute(
            "INSERT INTO batches (batch_id, batch_no, name, style, abv,
                                  brew_date, bottling_date, status,
                                  recipe_name, batch_notes, last_synced)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(batch_id) DO UPDATE SET
               batch_no = ?2, name = ?3, style = ?4, abv = ?5,
               brew_date = ?6, bottling_date = ?7, status = ?8,
               recipe_name = ?9, batch_notes = ?10, last_synced = ?11",
            rusqlite::params![
              b.id,
              b.batch_no,
              b.name,
              b.style,
              b.abv,
              b.brew_date,
              b.bottling_date,
              b.status,
              b.recipe_name,
              b.batch_notes,
              now,
            ],
          )?;
          count += 1;
        }
        tx.commit()?;
        Ok(count)
      })
      .await?;
    Ok(count)
  }

  // ── People and locations ──────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<Person>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt =
            conn.prepare("SELECT person_id, name FROM people ORDER BY name")?;
          let rows = stmt
            .query_map([], |row| {
              Ok(Person { id: row.get(0)?, name: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn add_person(&self, name: &str) -> Result<Person> {
    let name = normalize_name(name).map_err(Error::Core)?;
    let out: Result<Person, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if is_person(&tx, &name)? {
          return Ok(Err(CoreError::NameTaken {
            name,
            taken_by: NameKind::Person,
          }));
        }
        if location_name_exists(&tx, &name)? {
          return Ok(Err(CoreError::NameTaken {
            name,
            taken_by: NameKind::Location,
          }));
        }
        tx.execute(
          "INSERT INTO people (name) VALUES (?1)",
          rusqlite::params![name],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(Person { id, name }))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  async fn remove_person(&self, id: i64) -> Result<()> {
    let out: Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM people WHERE person_id = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::PersonNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  async fn list_locations(&self) -> Result<Vec<Location>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn
            .prepare("SELECT location_id, name FROM locations ORDER BY name")?;
          let rows = stmt
            .query_map([], |row| {
              Ok(Location { id: row.get(0)?, name: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn add_location(&self, name: &str) -> Result<Location> {
    let name = normalize_name(name).map_err(Error::Core)?;
    let out: Result<Location, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if location_name_exists(&tx, &name)? {
          return Ok(Err(CoreError::NameTaken {
            name,
            taken_by: NameKind::Location,
          }));
        }
        if is_person(&tx, &name)? {
          return Ok(Err(CoreError::NameTaken {
            name,
            taken_by: NameKind::Person,
          }));
        }
        tx.execute(
          "INSERT INTO locations (name) VALUES (?1)",
          rusqlite::params![name],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(Location { id, name }))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  async fn remove_location(&self, id: i64) -> Result<()> {
    let out: Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM locations WHERE location_id = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::LocationNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await?;
    Ok(out.map_err(Error::Core)?)
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn brewery_name(&self) -> Result<String> {
    Ok(
      self
        .conn
        .call(|conn| {
          ensure_settings_row(conn)?;
          let name: String = conn.query_row(
            "SELECT brewery_name FROM settings WHERE settings_id = 1",
            [],
            |row| row.get(0),
          )?;
          Ok(name)
        })
        .await?,
    )
  }

  async fn set_brewery_name(&self, name: &str) -> Result<String> {
    let name = normalize_name(name).map_err(Error::Core)?;
    Ok(
      self
        .conn
        .call(move |conn| {
          ensure_settings_row(conn)?;
          conn.execute(
            "UPDATE settings SET brewery_name = ?1 WHERE settings_id = 1",
            rusqlite::params![name],
          )?;
          Ok(name)
        })
        .await?,
    )
  }

  // ── Event log reads ───────────────────────────────────────────────────────

  async fn all_events(&self) -> Result<Vec<KegEvent>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, keg_id, event_type, person, batch_id, batch_name,
                  style, timestamp
           FROM keg_events ORDER BY timestamp, event_id",
        )?;
        let rows = stmt
          .query_map([], raw_event_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn recent_events(&self, limit: u32) -> Result<Vec<KegEvent>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, keg_id, event_type, person, batch_id, batch_name,
                  style, timestamp
           FROM keg_events ORDER BY timestamp DESC, event_id DESC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], raw_event_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}

fn raw_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:   row.get(0)?,
    keg_id:     row.get(1)?,
    event_type: row.get(2)?,
    person:     row.get(3)?,
    batch_id:   row.get(4)?,
    batch_name: row.get(5)?,
    style:      row.get(6)?,
    timestamp:  row.get(7)?,
  })
}
