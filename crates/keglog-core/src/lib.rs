//! Domain types, event derivation, statistics, and the store traits for
//! the keglog keg tracker.
//!
//! This crate stays free of HTTP and database dependencies; the other
//! crates in the workspace all build on it.

// Store traits use native async-fn-in-trait; suppress the advisory lint
// about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod batch;
pub mod error;
pub mod keg;
pub mod lifecycle;
pub mod roster;
pub mod stats;
pub mod store;

pub use error::{Error, Result};

/// Volume of one keg in litres. Every completed assignment counts as one
/// full keg for consumption totals.
pub const KEG_LITRES: u32 = 19;
