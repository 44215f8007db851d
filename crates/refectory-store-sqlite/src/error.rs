//! Error type for `refectory-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] refectory_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

/// Collapse backend faults into the core taxonomy so callers can match on
/// domain variants without knowing the backend.
impl From<Error> for refectory_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => refectory_core::Error::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
