//! SQLite backend for the Refectory dining store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! worker thread without blocking the async runtime. The single writer
//! connection also serialises every read-modify-write of a dish's derived
//! counters, which is what keeps concurrent ratings from losing updates.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
