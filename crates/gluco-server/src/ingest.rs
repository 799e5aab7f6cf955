//! Startup CSV ingestion.
//!
//! Reads every `*.csv` file in the configured data directory — one file per
//! user, the file stem being the user's id — and commits each file's parsed
//! rows as a single transaction. Runs to completion before the server
//! accepts traffic.
//!
//! Failure handling mirrors the export format's quirks: rows without a
//! usable timestamp are dropped silently inside the parser, rows with a
//! malformed numeric column are logged and skipped, and an unparseable file
//! name aborts the whole startup — that is a deployment mistake, not bad
//! data.

use std::path::Path;

use anyhow::Context as _;
use gluco_core::{record::NewRecord, store::RecordStore};
use gluco_csv::ExportRow;
use uuid::Uuid;

/// Totals across one ingestion run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IngestSummary {
  pub files:    usize,
  pub records:  usize,
  pub failures: usize,
}

fn to_new_record(user_id: Uuid, row: ExportRow) -> NewRecord {
  NewRecord {
    user_id,
    device: row.device,
    serial_number: row.serial_number,
    device_timestamp: Some(row.device_timestamp),
    record_type: row.record_type,
    glucose_value: row.glucose_value,
    glucose_scan: row.glucose_scan,
  }
}

/// Ingest every CSV export under `dir`.
///
/// A missing directory ingests nothing. Files are processed independently;
/// only a file whose stem is not a valid user id (or an I/O / storage
/// failure) aborts the run.
pub async fn ingest_dir<S>(store: &S, dir: &Path) -> anyhow::Result<IngestSummary>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut summary = IngestSummary::default();

  if !dir.is_dir() {
    tracing::warn!(dir = %dir.display(), "data directory not found; nothing to ingest");
    return Ok(summary);
  }

  let mut paths: Vec<_> = std::fs::read_dir(dir)
    .with_context(|| format!("failed to read data directory {}", dir.display()))?
    .collect::<Result<Vec<_>, _>>()?
    .into_iter()
    .map(|entry| entry.path())
    .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
    .collect();
  paths.sort();

  for path in paths {
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let stem = path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_default();

    let user_id = Uuid::parse_str(&stem)
      .with_context(|| format!("csv file name {stem:?} is not a valid user id"))?;

    let text = std::fs::read_to_string(&path)
      .with_context(|| format!("failed to read {}", path.display()))?;

    let parsed = gluco_csv::parse_export(&text);

    for failure in &parsed.failures {
      tracing::error!(
        file = %file_name,
        line = failure.line_number,
        row = %failure.row,
        error = %failure.error,
        "failed to convert csv row"
      );
    }

    let inputs: Vec<NewRecord> = parsed
      .rows
      .into_iter()
      .map(|row| to_new_record(user_id, row))
      .collect();

    let stored = store
      .create_records(inputs)
      .await
      .map_err(anyhow::Error::new)
      .with_context(|| format!("failed to persist records from {file_name}"))?;

    tracing::info!(file = %file_name, records = stored.len(), "committed csv file");

    summary.files += 1;
    summary.records += stored.len();
    summary.failures += parsed.failures.len();
  }

  Ok(summary)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use gluco_core::store::RecordQuery;
  use gluco_store_sqlite::SqliteStore;

  use super::*;

  const HEADER: &str = "Gerät,Seriennummer,Gerätezeitstempel,Aufzeichnungstyp,\
Glukosewert-Verlauf mg/dL,Glukose-Scan mg/dL";

  fn export_file(data_rows: &str) -> String {
    format!("Glukose-Werte,Erstellt am,29-08-2026 10:00 UTC\n{HEADER}\n{data_rows}")
  }

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory().await.unwrap()
  }

  #[tokio::test]
  async fn ingests_one_file_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    std::fs::write(
      dir.path().join(format!("{user_id}.csv")),
      export_file(
        "FreeStyle Libre,SN123,01-02-2024 08:30,0,95,\n\
         FreeStyle Libre,SN123,01-02-2024 08:45,1,,102\n",
      ),
    )
    .unwrap();

    let s = store().await;
    let summary = ingest_dir(&s, dir.path()).await.unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.failures, 0);

    let listed = s.list_records(&RecordQuery::for_user(user_id)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].user_id, user_id);
    assert_eq!(listed[0].glucose_value, Some(95));
  }

  #[tokio::test]
  async fn bad_rows_do_not_abort_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    std::fs::write(
      dir.path().join(format!("{user_id}.csv")),
      export_file(
        "FreeStyle Libre,SN123,01-02-2024 08:30,0,95,\n\
         FreeStyle Libre,SN123,Notiz hinzugefügt,6,,\n\
         FreeStyle Libre,SN123,01-02-2024 08:45,0,not-a-number,\n\
         FreeStyle Libre,SN123,01-02-2024 09:00,0,97,\n",
      ),
    )
    .unwrap();

    let s = store().await;
    let summary = ingest_dir(&s, dir.path()).await.unwrap();
    // Timestampless event row vanishes silently; the bad integer is a failure.
    assert_eq!(summary.records, 2);
    assert_eq!(summary.failures, 1);

    let listed = s.list_records(&RecordQuery::for_user(user_id)).await.unwrap();
    assert_eq!(listed.len(), 2);
  }

  #[tokio::test]
  async fn files_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    std::fs::write(
      dir.path().join(format!("{alice}.csv")),
      export_file("FreeStyle Libre,SN1,01-02-2024 08:30,0,95,\n"),
    )
    .unwrap();
    std::fs::write(
      dir.path().join(format!("{bob}.csv")),
      export_file("FreeStyle Libre,SN2,02-02-2024 08:30,0,110,\n"),
    )
    .unwrap();

    let s = store().await;
    let summary = ingest_dir(&s, dir.path()).await.unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.records, 2);

    let alice_rows = s.list_records(&RecordQuery::for_user(alice)).await.unwrap();
    assert_eq!(alice_rows.len(), 1);
    assert_eq!(alice_rows[0].serial_number.as_deref(), Some("SN1"));
  }

  #[tokio::test]
  async fn invalid_file_stem_aborts_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("not-a-uuid.csv"),
      export_file("FreeStyle Libre,SN1,01-02-2024 08:30,0,95,\n"),
    )
    .unwrap();

    let s = store().await;
    let err = ingest_dir(&s, dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("not-a-uuid"));
  }

  #[tokio::test]
  async fn non_csv_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), "nothing to see").unwrap();

    let s = store().await;
    let summary = ingest_dir(&s, dir.path()).await.unwrap();
    assert_eq!(summary.files, 0);
    assert_eq!(summary.records, 0);
  }

  #[tokio::test]
  async fn missing_directory_ingests_nothing() {
    let s = store().await;
    let summary = ingest_dir(&s, Path::new("/nonexistent/gluco-data"))
      .await
      .unwrap();
    assert_eq!(summary.files, 0);
  }
}
