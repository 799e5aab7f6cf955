//! Parsing of caller-supplied timestamps.
//!
//! Query bounds and creation input accept either a bare date or a full
//! date-time. A bare date means midnight of that date.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
  Error, Result,
  record::TIMESTAMP_FORMAT,
};

/// Parse a caller-supplied timestamp.
///
/// Accepted forms:
/// - `YYYY-MM-DDTHH:MM[:SS[.ffffff]]` (ISO date-time)
/// - `YYYY-MM-DD HH:MM:SS` (the service's own output format)
/// - `YYYY-MM-DD` (interpreted as midnight)
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
  let v = value.trim();
  if v.contains('T') {
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
      if let Ok(ts) = NaiveDateTime::parse_from_str(v, fmt) {
        return Ok(ts);
      }
    }
  } else if let Ok(ts) = NaiveDateTime::parse_from_str(v, TIMESTAMP_FORMAT) {
    return Ok(ts);
  } else if let Ok(date) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
    return Ok(date.and_time(NaiveTime::MIN));
  }
  Err(Error::InvalidTimestamp {
    value: value.to_string(),
  })
}
