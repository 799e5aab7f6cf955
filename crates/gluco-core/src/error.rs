//! Error types for `gluco-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid timestamp {value:?}: expected an ISO date or date-time")]
  InvalidTimestamp { value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
