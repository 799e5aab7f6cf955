//! gluco-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), rebuilds the
//! SQLite schema, loads every CSV export from the data directory, and only
//! then starts serving the JSON API.
//!
//! The schema reset plus fresh ingestion on every start is deliberate: the
//! CSV directory is the source of truth and the database is a disposable
//! working copy.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use gluco_core::store::RecordStore as _;
use gluco_server::{ServerConfig, ingest};
use gluco_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Glucose record service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GLUCO"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the store and rebuild the schema from scratch.
  let store = SqliteStore::open(&server_cfg.db_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.db_path))?;
  store
    .reset_schema()
    .await
    .context("failed to reset schema")?;
  tracing::info!(db = %server_cfg.db_path.display(), "schema rebuilt");

  // Startup barrier: ingest every export before accepting traffic.
  let summary = ingest::ingest_dir(&store, &server_cfg.data_dir)
    .await
    .context("csv ingestion failed")?;
  tracing::info!(
    files = summary.files,
    records = summary.records,
    failures = summary.failures,
    "ingestion complete"
  );

  let app = gluco_server::router(Arc::new(store));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
