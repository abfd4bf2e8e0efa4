//! Error type for `keglog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] keglog_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("stored value did not decode: {0}")]
  Decode(String),
}

/// Domain failures pass through; backend failures collapse into
/// [`keglog_core::Error::Storage`] so API layers can map them uniformly.
impl From<Error> for keglog_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Database(inner) => keglog_core::Error::Storage(inner.to_string()),
      Error::Decode(msg) => keglog_core::Error::Storage(msg),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
