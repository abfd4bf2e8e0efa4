//! Error types for `keglog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("keg not found: {0}")]
  KegNotFound(i64),

  #[error("batch not found: {0}")]
  BatchNotFound(String),

  #[error("person not found: {0}")]
  PersonNotFound(i64),

  #[error("location not found: {0}")]
  LocationNotFound(i64),

  /// A keg with a batch still assigned cannot be deleted; reset it first.
  #[error("keg {0} has a batch assigned; reset it before deleting")]
  BatchAssigned(i64),

  /// Person and location names share one namespace.
  #[error("the name {name:?} is already taken by a {taken_by}")]
  NameTaken { name: String, taken_by: NameKind },

  #[error("name cannot be empty")]
  EmptyName,

  /// Backend failure surfaced through the store abstraction.
  #[error("storage error: {0}")]
  Storage(String),
}

/// Which namespace already holds a contested name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
  Person,
  Location,
}

impl std::fmt::Display for NameKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      NameKind::Person => write!(f, "person"),
      NameKind::Location => write!(f, "location"),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
