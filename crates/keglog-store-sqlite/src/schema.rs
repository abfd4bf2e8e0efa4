//! SQL schema for the keglog SQLite store.
//!
//! Run at every connection startup; `PRAGMA user_version` marks the schema
//! revision so future migrations can gate on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS kegs (
    keg_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    label          TEXT NOT NULL DEFAULT '',
    status         TEXT NOT NULL DEFAULT 'empty',  -- 'empty' | 'full' | 'on_tap'
    location       TEXT NOT NULL DEFAULT '',
    batch_id       TEXT,            -- no FK: the batch may vanish, the keg keeps the id
    date_purchased TEXT NOT NULL DEFAULT '',
    notes          TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS batches (
    batch_id      TEXT PRIMARY KEY, -- external id from the brewing-log API
    batch_no      INTEGER,
    name          TEXT NOT NULL DEFAULT '',
    style         TEXT NOT NULL DEFAULT '',
    abv           REAL,
    brew_date     TEXT NOT NULL DEFAULT '',
    bottling_date TEXT NOT NULL DEFAULT '',
    status        TEXT NOT NULL DEFAULT '',
    recipe_name   TEXT NOT NULL DEFAULT '',
    batch_notes   TEXT NOT NULL DEFAULT '',
    last_synced   TEXT NOT NULL     -- ISO 8601 UTC
);

-- People and locations share one name namespace; both UNIQUE constraints
-- plus cross-table checks at insert time.
CREATE TABLE IF NOT EXISTS people (
    person_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS locations (
    location_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS settings (
    settings_id  INTEGER PRIMARY KEY CHECK (settings_id = 1),
    brewery_name TEXT NOT NULL DEFAULT 'Blue Dog Brewing'
);

-- The event log is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table; events outlive
-- their keg. batch_name/style are snapshots taken at emission time.
CREATE TABLE IF NOT EXISTS keg_events (
    event_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    keg_id     INTEGER NOT NULL,
    event_type TEXT NOT NULL,       -- 'filled' | 'assigned' | 'tapped' | 'returned' | 'deleted'
    person     TEXT NOT NULL DEFAULT '',
    batch_id   TEXT,
    batch_name TEXT NOT NULL DEFAULT '',
    style      TEXT NOT NULL DEFAULT '',
    timestamp  TEXT NOT NULL        -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS keg_events_keg_idx  ON keg_events(keg_id);
CREATE INDEX IF NOT EXISTS keg_events_time_idx ON keg_events(timestamp);

PRAGMA user_version = 1;
";
