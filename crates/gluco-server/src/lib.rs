//! HTTP server assembly for the gluco record service.
//!
//! Owns runtime configuration and the top-level router; the API surface
//! itself lives in `gluco-api`, storage in `gluco-store-sqlite`, and the
//! startup CSV load in [`ingest`].

pub mod ingest;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use gluco_core::store::RecordStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and/or
/// `GLUCO_*` environment variables. Every field has a development default,
/// so the server runs with no config file at all.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  /// SQLite database file. Dropped and rebuilt at every startup.
  #[serde(default = "default_db_path")]
  pub db_path:  PathBuf,
  /// Directory of per-user CSV exports, named `<user_id>.csv`.
  #[serde(default = "default_data_dir")]
  pub data_dir: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_db_path() -> PathBuf { PathBuf::from("gluco.db") }
fn default_data_dir() -> PathBuf { PathBuf::from("sample-data") }

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router: the JSON API under `/api/v1`, with
/// request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .nest("/api/v1", gluco_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────
