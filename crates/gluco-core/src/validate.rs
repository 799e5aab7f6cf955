//! Explicit input validation for record creation.
//!
//! Creation bodies deserialise into the loose [`RecordDraft`] (every field
//! optional) and pass through [`validate_draft`], which returns a tagged
//! success/failure result independent of any web framework's binding
//! mechanism. Failures carry the offending field name for 422 responses.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{record::NewRecord, time::parse_timestamp};

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Unvalidated creation input. Only `user_id` is required by the contract;
/// every other field may be `null` or absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordDraft {
  pub user_id:          Option<String>,
  pub device:           Option<String>,
  pub serial_number:    Option<String>,
  /// ISO date or date-time; see [`parse_timestamp`].
  pub device_timestamp: Option<String>,
  pub record_type:      Option<i64>,
  pub glucose_value:    Option<i64>,
  pub glucose_scan:     Option<i64>,
}

// ─── Error ───────────────────────────────────────────────────────────────────

/// A single-field validation failure.
#[derive(Debug, Clone, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
  pub field:   &'static str,
  pub message: String,
}

impl ValidationError {
  fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Validate a draft into a [`NewRecord`] ready for the store.
pub fn validate_draft(draft: RecordDraft) -> Result<NewRecord, ValidationError> {
  let user_id = match draft.user_id {
    None => return Err(ValidationError::new("user_id", "field is required")),
    Some(raw) => Uuid::parse_str(raw.trim())
      .map_err(|e| ValidationError::new("user_id", format!("not a valid uuid: {e}")))?,
  };

  let device_timestamp = draft
    .device_timestamp
    .as_deref()
    .map(parse_timestamp)
    .transpose()
    .map_err(|e| ValidationError::new("device_timestamp", e.to_string()))?;

  Ok(NewRecord {
    user_id,
    device: draft.device,
    serial_number: draft.serial_number,
    device_timestamp,
    record_type: draft.record_type,
    glucose_value: draft.glucose_value,
    glucose_scan: draft.glucose_scan,
  })
}
