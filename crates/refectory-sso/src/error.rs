//! Error type for `refectory-sso`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The upstream could not be reached, timed out, or refused transport.
  #[error("upstream transport error: {0}")]
  Upstream(#[from] reqwest::Error),

  /// The upstream answered, but not in the shape the protocol promises
  /// (bad ticket prefix, authentication failure, unparseable XML).
  #[error("protocol error: {0}")]
  Protocol(String),

  /// The validation document parsed but lacked a required element.
  #[error("validation response missing {0}")]
  MissingField(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
