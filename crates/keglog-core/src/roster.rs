//! People and locations — the two disjoint name registries.
//!
//! A keg's free-text location is promoted to an "assignment" when it matches
//! a Person name, so the two namespaces must not overlap: a name that exists
//! as a person cannot also be created as a location, and vice versa.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Someone kegs get assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub id:   i64,
  pub name: String,
}

/// A physical place a keg can sit (cold room, bar, garage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
  pub id:   i64,
  pub name: String,
}

/// Trim a submitted name and reject it when nothing is left.
pub fn normalize_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::EmptyName);
  }
  Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_trims_whitespace() {
    assert_eq!(normalize_name("  Troy ").unwrap(), "Troy");
  }

  #[test]
  fn normalize_rejects_blank() {
    assert!(matches!(normalize_name("   "), Err(Error::EmptyName)));
  }
}
