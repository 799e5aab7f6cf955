//! Handlers for `/levels/` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/levels/` | `?user_id` required; optional `start`, `end`, `limit`, `offset` |
//! | `GET`  | `/levels/:id` | Single record, 404 if absent |
//! | `POST` | `/levels/` | Body: [`RecordDraft`]; returns 200 + stored record |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use gluco_core::{
  record::GlucoseRecord,
  store::{RecordQuery, RecordStore},
  time::parse_timestamp,
  validate::{RecordDraft, ValidationError, validate_draft},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Required: the user whose records to return.
  pub user_id: Uuid,
  /// Inclusive lower bound; bare `YYYY-MM-DD` or ISO date-time.
  pub start:   Option<String>,
  /// Inclusive upper bound; same forms as `start`.
  pub end:     Option<String>,
  pub limit:   Option<usize>,
  pub offset:  Option<usize>,
}

fn parse_bound(
  value: Option<&str>,
  field: &'static str,
) -> Result<Option<chrono::NaiveDateTime>, ApiError> {
  value
    .map(parse_timestamp)
    .transpose()
    .map_err(|e| {
      ApiError::Validation(ValidationError {
        field,
        message: e.to_string(),
      })
    })
}

/// `GET /levels/?user_id=<id>[&start=...][&end=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<GlucoseRecord>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = RecordQuery {
    user_id: params.user_id,
    start:   parse_bound(params.start.as_deref(), "start")?,
    end:     parse_bound(params.end.as_deref(), "end")?,
    limit:   params.limit,
    offset:  params.offset,
  };

  let records = store
    .list_records(&query)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(records))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /levels/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GlucoseRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let record = store
    .get_record(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("record not found".to_string()))?;
  Ok(Json(record))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /levels/` — body is a [`RecordDraft`]; only `user_id` is required.
///
/// Returns 200 with the stored record (generated id included), or 422 with
/// the offending field on validation failure.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(draft): Json<RecordDraft>,
) -> Result<Json<GlucoseRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let input = validate_draft(draft)?;
  let record = store
    .create_record(input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(record))
}
