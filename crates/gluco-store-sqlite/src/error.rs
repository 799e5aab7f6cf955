//! Error type for `gluco-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("timestamp parse error: {0}")]
  TimestampParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
