//! Core types and trait definitions for Tally, a daily metrics check-in
//! store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the metric schema, the per-type entry rules, and the day submission engine;
//! storage backends plug in through the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod day;
pub mod engine;
pub mod error;
pub mod metric;
pub mod store;
pub mod validate;

pub use error::{Error, Result, ValidationError};
