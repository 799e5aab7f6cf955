//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. Timestamps are stored as
//! `YYYY-MM-DD HH:MM:SS` text, so SQL string comparison on the column is
//! chronological comparison.

use chrono::NaiveDateTime;
use gluco_core::record::{GlucoseRecord, TIMESTAMP_FORMAT};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_ts(ts: NaiveDateTime) -> String {
  ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn decode_ts(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
    .map_err(|e| Error::TimestampParse(e.to_string()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Plain column values read from (or bound into) a `glucose_records` row.
pub struct RecordRow {
  pub id:               String,
  pub user_id:          String,
  pub device:           Option<String>,
  pub serial_number:    Option<String>,
  pub device_timestamp: Option<String>,
  pub record_type:      Option<i64>,
  pub glucose_value:    Option<i64>,
  pub glucose_scan:     Option<i64>,
}

impl RecordRow {
  pub fn from_record(record: &GlucoseRecord) -> Self {
    Self {
      id:               encode_uuid(record.id),
      user_id:          encode_uuid(record.user_id),
      device:           record.device.clone(),
      serial_number:    record.serial_number.clone(),
      device_timestamp: record.device_timestamp.map(encode_ts),
      record_type:      record.record_type,
      glucose_value:    record.glucose_value,
      glucose_scan:     record.glucose_scan,
    }
  }

  pub fn into_record(self) -> Result<GlucoseRecord> {
    Ok(GlucoseRecord {
      id:               decode_uuid(&self.id)?,
      user_id:          decode_uuid(&self.user_id)?,
      device:           self.device,
      serial_number:    self.serial_number,
      device_timestamp: self
        .device_timestamp
        .as_deref()
        .map(decode_ts)
        .transpose()?,
      record_type:      self.record_type,
      glucose_value:    self.glucose_value,
      glucose_scan:     self.glucose_scan,
    })
  }
}
