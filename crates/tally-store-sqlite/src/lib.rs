//! SQLite backend for the Tally check-in store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Day submissions run inside a single
//! `IMMEDIATE` transaction on that thread.

mod encode;
mod queries;
mod schema;
mod store;
mod tx;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
