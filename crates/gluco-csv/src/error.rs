//! Error types for `gluco-csv`.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
  /// A numeric column held something other than an integer (after the
  /// row's timestamp parsed successfully).
  #[error("column {column:?} is not an integer: {value:?}")]
  InvalidInteger {
    column: &'static str,
    value:  String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
