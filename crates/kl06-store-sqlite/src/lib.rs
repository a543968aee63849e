//! SQLite persistence for normalized kl06 snapshots.
//!
//! [`SqliteStore`] implements [`kl06_core::sink::SnapshotSink`]: each write
//! replaces the previous contents of one kind's table, so re-running a dump
//! against the same database file converges on the same rows.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
