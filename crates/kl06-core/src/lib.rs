//! Core types and trait definitions for the kl06 curriculum normalizer.
//!
//! This crate is deliberately free of I/O dependencies. All other crates
//! depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod label;
pub mod record;
pub mod sink;
pub mod snapshot;
pub mod status;
pub mod title;

pub use error::{Error, Result};
