//! Parser for the vendor glucose-meter CSV export format.
//!
//! One export file holds one user's readings. The file starts with a
//! vendor preamble line, then a German-language column header row, then
//! data rows. Rows without a parsable device timestamp are event rows
//! (alarms, notes) and are dropped without comment; rows that carry a
//! valid timestamp but a malformed numeric column are reported back to
//! the caller as failures.
//!
//! This crate is pure text → rows; file I/O and persistence live in the
//! server's ingestion step.

pub mod error;
mod parse;

pub use error::{Error, Result};
pub use parse::{ExportRow, ParsedExport, RowFailure, parse_export};
