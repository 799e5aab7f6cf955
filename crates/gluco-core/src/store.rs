//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `gluco-store-sqlite`).
//! Higher layers (`gluco-api`, `gluco-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::record::{GlucoseRecord, NewRecord};

/// Page size applied when a query gives no explicit limit.
pub const DEFAULT_LIMIT: usize = 100;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RecordStore::list_records`].
#[derive(Debug, Clone)]
pub struct RecordQuery {
  /// The user whose records to return.
  pub user_id: Uuid,
  /// Inclusive lower bound on `device_timestamp`.
  pub start:   Option<NaiveDateTime>,
  /// Inclusive upper bound on `device_timestamp`.
  pub end:     Option<NaiveDateTime>,
  /// Defaults to [`DEFAULT_LIMIT`].
  pub limit:   Option<usize>,
  /// Defaults to 0.
  pub offset:  Option<usize>,
}

impl RecordQuery {
  /// Query for all of a user's records with default pagination.
  pub fn for_user(user_id: Uuid) -> Self {
    Self {
      user_id,
      start: None,
      end: None,
      limit: None,
      offset: None,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a glucose record store backend.
///
/// Records are created (one at a time, or per-file batches during
/// ingestion) and read; they are never updated or deleted short of a full
/// schema reset.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new record and return it with its generated id.
  fn create_record(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<GlucoseRecord, Self::Error>> + Send + '_;

  /// Persist a batch of records in a single transaction.
  ///
  /// This is the commit unit for CSV ingestion: either the whole batch is
  /// stored or none of it is.
  fn create_records(
    &self,
    inputs: Vec<NewRecord>,
  ) -> impl Future<Output = Result<Vec<GlucoseRecord>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a record by id. Returns `None` if not found.
  fn get_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<GlucoseRecord>, Self::Error>> + Send + '_;

  /// List a user's records, filtered and paginated per `query`.
  ///
  /// Results come back in insertion order; an empty result is not an
  /// error. Records with no timestamp are excluded once a bound is set.
  fn list_records<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<GlucoseRecord>, Self::Error>> + Send + 'a;

  /// The fraction of a user's records whose `glucose_value` or
  /// `glucose_scan` is at or below `threshold`, out of the user's total
  /// record count. `0.0` for a user with no records.
  fn threshold_ratio(
    &self,
    user_id: Uuid,
    threshold: i64,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Drop and recreate the schema, discarding every stored record.
  ///
  /// Run once at process startup before ingestion. Destructive.
  fn reset_schema(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
