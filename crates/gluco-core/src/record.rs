//! Record types — the persisted unit of the gluco store.
//!
//! A record is one glucose measurement event tied to a user. Records are
//! immutable once created; there is no update or delete operation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire and column format for device timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── GlucoseRecord ───────────────────────────────────────────────────────────

/// A stored glucose measurement. `id` is assigned exactly once by the store;
/// every field other than `id` and `user_id` may be absent.
///
/// The device reports local wall-clock time with no zone, hence
/// [`NaiveDateTime`]. JSON renders the timestamp as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseRecord {
  pub id:               Uuid,
  pub user_id:          Uuid,
  pub device:           Option<String>,
  pub serial_number:    Option<String>,
  #[serde(default, with = "timestamp")]
  pub device_timestamp: Option<NaiveDateTime>,
  pub record_type:      Option<i64>,
  pub glucose_value:    Option<i64>,
  pub glucose_scan:     Option<i64>,
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::create_record`].
/// `id` is always assigned by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub user_id:          Uuid,
  pub device:           Option<String>,
  pub serial_number:    Option<String>,
  pub device_timestamp: Option<NaiveDateTime>,
  pub record_type:      Option<i64>,
  pub glucose_value:    Option<i64>,
  pub glucose_scan:     Option<i64>,
}

impl NewRecord {
  /// Convenience constructor with all optional fields absent.
  pub fn new(user_id: Uuid) -> Self {
    Self {
      user_id,
      device: None,
      serial_number: None,
      device_timestamp: None,
      record_type: None,
      glucose_value: None,
      glucose_scan: None,
    }
  }
}

// ─── Serde adapter ───────────────────────────────────────────────────────────

/// Serde adapter rendering `Option<NaiveDateTime>` as
/// `YYYY-MM-DD HH:MM:SS` (or `null`).
mod timestamp {
  use chrono::NaiveDateTime;
  use serde::{Deserialize as _, Deserializer, Serializer};

  use super::TIMESTAMP_FORMAT;

  pub fn serialize<S>(
    value: &Option<NaiveDateTime>,
    serializer: S,
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match value {
      Some(ts) => {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
      }
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(
    deserializer: D,
  ) -> Result<Option<NaiveDateTime>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw
      .map(|s| {
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
          .map_err(serde::de::Error::custom)
      })
      .transpose()
  }
}
