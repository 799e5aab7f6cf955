//! Handler for `GET /threshold/`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use gluco_core::store::RecordStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ThresholdParams {
  pub user_id:   Uuid,
  pub threshold: i64,
}

#[derive(Debug, Serialize)]
pub struct ThresholdOut {
  /// Fraction of the user's records at or below the threshold on either
  /// glucose channel. `0.0` for a user with no records.
  pub below_threshold: f64,
}

/// `GET /threshold/?user_id=<id>&threshold=<int>`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ThresholdParams>,
) -> Result<Json<ThresholdOut>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let below_threshold = store
    .threshold_ratio(params.user_id, params.threshold)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ThresholdOut { below_threshold }))
}
