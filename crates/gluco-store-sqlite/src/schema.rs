//! SQL schema for the gluco SQLite store.
//!
//! `SCHEMA` is idempotent and runs at every connection open; `RESET` is the
//! destructive startup path that discards all stored records first.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS glucose_records (
    id                TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL,   -- no user table; not a foreign key
    device            TEXT,
    serial_number     TEXT,
    device_timestamp  TEXT,            -- 'YYYY-MM-DD HH:MM:SS'; sorts chronologically
    record_type       INTEGER,
    glucose_value     INTEGER,
    glucose_scan      INTEGER
);

CREATE INDEX IF NOT EXISTS records_user_idx      ON glucose_records(user_id);
CREATE INDEX IF NOT EXISTS records_timestamp_idx ON glucose_records(device_timestamp);
";

/// Drops the table ahead of a fresh ingestion run.
pub const RESET: &str = "DROP TABLE IF EXISTS glucose_records;";
