//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use gluco_core::{
  record::{GlucoseRecord, NewRecord},
  store::{DEFAULT_LIMIT, RecordQuery, RecordStore},
};

use crate::{
  Error, Result,
  encode::{RecordRow, encode_ts, encode_uuid},
  schema::{RESET, SCHEMA},
};

const COLUMNS: &str = "id, user_id, device, serial_number, device_timestamp, \
record_type, glucose_value, glucose_scan";

const INSERT_SQL: &str = "INSERT INTO glucose_records (
   id, user_id, device, serial_number, device_timestamp,
   record_type, glucose_value, glucose_scan
 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gluco record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  ///
  /// Opening never discards data; the destructive startup path is
  /// [`RecordStore::reset_schema`].
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
  Ok(RecordRow {
    id:               row.get(0)?,
    user_id:          row.get(1)?,
    device:           row.get(2)?,
    serial_number:    row.get(3)?,
    device_timestamp: row.get(4)?,
    record_type:      row.get(5)?,
    glucose_value:    row.get(6)?,
    glucose_scan:     row.get(7)?,
  })
}

/// Assign the server-generated id; everything else passes through.
fn build_record(input: NewRecord) -> GlucoseRecord {
  GlucoseRecord {
    id:               Uuid::new_v4(),
    user_id:          input.user_id,
    device:           input.device,
    serial_number:    input.serial_number,
    device_timestamp: input.device_timestamp,
    record_type:      input.record_type,
    glucose_value:    input.glucose_value,
    glucose_scan:     input.glucose_scan,
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_record(&self, input: NewRecord) -> Result<GlucoseRecord> {
    let record = build_record(input);
    let row = RecordRow::from_record(&record);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          INSERT_SQL,
          rusqlite::params![
            row.id,
            row.user_id,
            row.device,
            row.serial_number,
            row.device_timestamp,
            row.record_type,
            row.glucose_value,
            row.glucose_scan,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn create_records(
    &self,
    inputs: Vec<NewRecord>,
  ) -> Result<Vec<GlucoseRecord>> {
    let records: Vec<GlucoseRecord> =
      inputs.into_iter().map(build_record).collect();
    let rows: Vec<RecordRow> =
      records.iter().map(RecordRow::from_record).collect();

    // One transaction per batch: a file's rows land together or not at all.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(INSERT_SQL)?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.id,
              row.user_id,
              row.device,
              row.serial_number,
              row.device_timestamp,
              row.record_type,
              row.glucose_value,
              row.glucose_scan,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(records)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_record(&self, id: Uuid) -> Result<Option<GlucoseRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RecordRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM glucose_records WHERE id = ?1"),
              rusqlite::params![id_str],
              map_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RecordRow::into_record).transpose()
  }

  async fn list_records(
    &self,
    query: &RecordQuery,
  ) -> Result<Vec<GlucoseRecord>> {
    let user_id_str = encode_uuid(query.user_id);
    let start_str   = query.start.map(encode_ts);
    let end_str     = query.end.map(encode_ts);
    let limit_val   = query.limit.unwrap_or(DEFAULT_LIMIT) as i64;
    let offset_val  = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RecordRow> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically. The LIMIT/OFFSET placeholders keep
        // the statement's parameter count at 5 even when a bound is absent.
        let mut conds: Vec<&'static str> = vec!["user_id = ?1"];
        if start_str.is_some() {
          conds.push("device_timestamp >= ?2");
        }
        if end_str.is_some() {
          conds.push("device_timestamp <= ?3");
        }

        // No ORDER BY: callers rely on insertion (rowid) order.
        let sql = format!(
          "SELECT {COLUMNS} FROM glucose_records
           WHERE {}
           LIMIT ?4 OFFSET ?5",
          conds.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              user_id_str,
              start_str,
              end_str,
              limit_val,
              offset_val,
            ],
            map_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RecordRow::into_record).collect()
  }

  async fn threshold_ratio(
    &self,
    user_id: Uuid,
    threshold: i64,
  ) -> Result<f64> {
    let user_id_str = encode_uuid(user_id);

    let (total, below): (i64, i64) = self
      .conn
      .call(move |conn| {
        let (total, below): (i64, Option<i64>) = conn.query_row(
          "SELECT
             COUNT(*),
             SUM(CASE WHEN glucose_value <= ?2 OR glucose_scan <= ?2
                 THEN 1 ELSE 0 END)
           FROM glucose_records
           WHERE user_id = ?1",
          rusqlite::params![user_id_str, threshold],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        // SUM over zero rows is NULL.
        Ok((total, below.unwrap_or(0)))
      })
      .await?;

    if total == 0 {
      Ok(0.0)
    } else {
      Ok(below as f64 / total as f64)
    }
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn reset_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(RESET)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
