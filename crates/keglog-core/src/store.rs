//! The `KegStore` trait and the external batch-source contract.
//!
//! `KegStore` is implemented by storage backends (e.g.
//! `keglog-store-sqlite`). Higher layers (`keglog-api`, `keglog-server`)
//! depend on these abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  batch::{Batch, NewBatch},
  keg::{KegPatch, KegWithBatch},
  lifecycle::KegEvent,
  roster::{Location, Person},
};

/// Abstraction over a keglog storage backend.
///
/// Keg rows are mutable current state; the event log is append-only and
/// events are derived exclusively from state transitions inside
/// `update_keg`, `reset_keg`, and `delete_keg`. Each of those is atomic
/// per keg: the read-merge-diff-append-write sequence happens inside one
/// transaction.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). The associated
/// error converts into [`crate::Error`] so callers can map domain failures
/// (not-found, conflict) without knowing the backend.
pub trait KegStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Kegs ──────────────────────────────────────────────────────────────

  /// All kegs ordered by id, each with its batch summary joined in.
  fn list_kegs(
    &self,
  ) -> impl Future<Output = Result<Vec<KegWithBatch>, Self::Error>> + Send + '_;

  fn get_keg(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<KegWithBatch>, Self::Error>> + Send + '_;

  /// Create an empty keg labelled after the next fleet number.
  fn create_keg(
    &self,
  ) -> impl Future<Output = Result<KegWithBatch, Self::Error>> + Send + '_;

  /// Seed the initial fleet if no kegs exist yet. Returns how many were
  /// inserted (zero when the fleet already exists).
  fn seed_kegs(
    &self,
    count: u32,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Merge `patch` into the keg and append whatever lifecycle events the
  /// transition implies. Fails with a not-found error if the keg is absent.
  fn update_keg(
    &self,
    id: i64,
    patch: KegPatch,
  ) -> impl Future<Output = Result<KegWithBatch, Self::Error>> + Send + '_;

  /// Log a `returned` event if the keg is out with a person or holds a
  /// batch, then clear the keg back to empty.
  fn reset_keg(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<KegWithBatch, Self::Error>> + Send + '_;

  /// Append a `deleted` event and remove the keg row. Fails with a
  /// conflict error while a batch is still assigned; the event log entry
  /// is retained after deletion.
  fn delete_keg(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Batches ───────────────────────────────────────────────────────────

  /// All batches, newest brew date first.
  fn list_batches(
    &self,
  ) -> impl Future<Output = Result<Vec<Batch>, Self::Error>> + Send + '_;

  /// Upsert synced batches by external id, stamping `last_synced`.
  /// Returns the number of records written.
  fn upsert_batches(
    &self,
    batches: Vec<NewBatch>,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── People and locations ──────────────────────────────────────────────

  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Add a person. The name is trimmed; empty names and names already used
  /// by a person or location are rejected.
  fn add_person<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + 'a;

  fn remove_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  /// Add a location, under the same naming rules as [`Self::add_person`].
  fn add_location<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + 'a;

  fn remove_location(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  fn brewery_name(
    &self,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  fn set_brewery_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  // ── Event log reads ───────────────────────────────────────────────────

  /// The full event log ascending by (timestamp, id) — the statistics
  /// engine's input.
  fn all_events(
    &self,
  ) -> impl Future<Output = Result<Vec<KegEvent>, Self::Error>> + Send + '_;

  /// The latest `limit` events, newest first.
  fn recent_events(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<KegEvent>, Self::Error>> + Send + '_;
}

/// The external batch-metadata source (the brewing-log API).
///
/// Implementations fetch and map raw records; persisting them is the
/// store's job. Fetch failures surface to the API layer as a gateway
/// error; there is no retry here beyond the fetcher's own pagination cap.
pub trait BatchSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch_batches(
    &self,
  ) -> impl Future<Output = Result<Vec<NewBatch>, Self::Error>> + Send + '_;
}
