//! SQLite backend for the keglog keg store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Keg mutations run inside a
//! single transaction each, so the read-merge-diff-append-write sequence is
//! atomic relative to concurrent mutations on the same keg.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
