//! Vendor CSV export parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ strip BOM, drop blank lines
//!          └─ discard preamble, read header row
//!               └─ split_fields() per data line
//!                    └─ parse_row() → row | silent skip | failure

use chrono::NaiveDateTime;

use crate::error::Error;

// ─── Column names ────────────────────────────────────────────────────────────

// Exact (trimmed) header names as written by the vendor export.
const DEVICE_COLUMN: &str = "Gerät";
const SERIAL_COLUMN: &str = "Seriennummer";
const TIMESTAMP_COLUMN: &str = "Gerätezeitstempel";
const RECORD_TYPE_COLUMN: &str = "Aufzeichnungstyp";
const GLUCOSE_VALUE_COLUMN: &str = "Glukosewert-Verlauf mg/dL";
const GLUCOSE_SCAN_COLUMN: &str = "Glukose-Scan mg/dL";

/// Device timestamps are day-month-year with no seconds.
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

// ─── Output types ────────────────────────────────────────────────────────────

/// One successfully parsed data row. The timestamp is always present:
/// rows without one never make it out of the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
  pub device:           Option<String>,
  pub serial_number:    Option<String>,
  pub device_timestamp: NaiveDateTime,
  pub record_type:      Option<i64>,
  pub glucose_value:    Option<i64>,
  pub glucose_scan:     Option<i64>,
}

/// A row that had a valid timestamp but failed conversion.
#[derive(Debug, Clone)]
pub struct RowFailure {
  /// 1-based position among the data rows (after preamble and header).
  pub line_number: usize,
  /// The raw line, for the caller's log.
  pub row:         String,
  pub error:       Error,
}

/// The result of parsing one export file.
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
  pub rows:     Vec<ExportRow>,
  pub failures: Vec<RowFailure>,
}

// ─── Field splitting ─────────────────────────────────────────────────────────

/// Split a CSV line on commas, respecting double-quoted fields.
/// `""` inside a quoted field is an escaped quote.
fn split_fields(line: &str) -> Vec<String> {
  let mut fields = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;
  let mut chars = line.chars().peekable();

  while let Some(c) = chars.next() {
    match c {
      '"' if in_quotes => {
        if chars.peek() == Some(&'"') {
          current.push('"');
          chars.next();
        } else {
          in_quotes = false;
        }
      }
      '"' if current.is_empty() => in_quotes = true,
      ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
      _ => current.push(c),
    }
  }
  fields.push(current);
  fields
}

// ─── Header mapping ──────────────────────────────────────────────────────────

/// Positions of the columns we care about; a column missing from the
/// header stays `None` and its field parses as absent.
#[derive(Debug, Default)]
struct Columns {
  device:        Option<usize>,
  serial_number: Option<usize>,
  timestamp:     Option<usize>,
  record_type:   Option<usize>,
  glucose_value: Option<usize>,
  glucose_scan:  Option<usize>,
}

impl Columns {
  fn from_header(fields: &[String]) -> Self {
    let mut columns = Self::default();
    for (i, name) in fields.iter().enumerate() {
      match name.trim() {
        DEVICE_COLUMN => columns.device = Some(i),
        SERIAL_COLUMN => columns.serial_number = Some(i),
        TIMESTAMP_COLUMN => columns.timestamp = Some(i),
        RECORD_TYPE_COLUMN => columns.record_type = Some(i),
        GLUCOSE_VALUE_COLUMN => columns.glucose_value = Some(i),
        GLUCOSE_SCAN_COLUMN => columns.glucose_scan = Some(i),
        _ => {}
      }
    }
    columns
  }
}

// ─── Row parsing ─────────────────────────────────────────────────────────────

enum RowOutcome {
  Row(ExportRow),
  /// No usable timestamp — an event row, dropped without comment.
  Skipped,
  Failed(Error),
}

fn text_field(values: &[String], idx: Option<usize>) -> Option<String> {
  // Short rows leave trailing columns absent; a present-but-empty field
  // stays an empty string, matching the upstream export semantics.
  idx.and_then(|i| values.get(i).cloned())
}

fn int_field(
  values: &[String],
  idx: Option<usize>,
  column: &'static str,
) -> Result<Option<i64>, Error> {
  let Some(raw) = idx.and_then(|i| values.get(i)) else {
    return Ok(None);
  };
  if raw.is_empty() {
    return Ok(None);
  }
  raw.parse::<i64>().map(Some).map_err(|_| Error::InvalidInteger {
    column,
    value: raw.clone(),
  })
}

fn parse_row(columns: &Columns, line: &str) -> RowOutcome {
  let values: Vec<String> = split_fields(line)
    .into_iter()
    .map(|v| v.trim().to_string())
    .collect();

  let timestamp_raw = columns
    .timestamp
    .and_then(|i| values.get(i))
    .map(String::as_str)
    .unwrap_or("");
  let Ok(device_timestamp) =
    NaiveDateTime::parse_from_str(timestamp_raw, TIMESTAMP_FORMAT)
  else {
    return RowOutcome::Skipped;
  };

  let record_type =
    match int_field(&values, columns.record_type, RECORD_TYPE_COLUMN) {
      Ok(v) => v,
      Err(e) => return RowOutcome::Failed(e),
    };
  let glucose_value =
    match int_field(&values, columns.glucose_value, GLUCOSE_VALUE_COLUMN) {
      Ok(v) => v,
      Err(e) => return RowOutcome::Failed(e),
    };
  let glucose_scan =
    match int_field(&values, columns.glucose_scan, GLUCOSE_SCAN_COLUMN) {
      Ok(v) => v,
      Err(e) => return RowOutcome::Failed(e),
    };

  RowOutcome::Row(ExportRow {
    device: text_field(&values, columns.device),
    serial_number: text_field(&values, columns.serial_number),
    device_timestamp,
    record_type,
    glucose_value,
    glucose_scan,
  })
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Parse one export file.
///
/// The first non-blank line is the vendor preamble and is discarded
/// unconditionally; the second is the header. Anything shorter yields an
/// empty result, not an error.
pub fn parse_export(input: &str) -> ParsedExport {
  let text = input.strip_prefix('\u{feff}').unwrap_or(input);
  let lines: Vec<&str> =
    text.lines().filter(|l| !l.trim().is_empty()).collect();

  if lines.len() < 2 {
    return ParsedExport::default();
  }

  let columns = Columns::from_header(&split_fields(lines[1]));
  let mut export = ParsedExport::default();

  for (i, line) in lines[2..].iter().enumerate() {
    match parse_row(&columns, line) {
      RowOutcome::Row(row) => export.rows.push(row),
      RowOutcome::Skipped => {}
      RowOutcome::Failed(error) => export.failures.push(RowFailure {
        line_number: i + 1,
        row: (*line).to_string(),
        error,
      }),
    }
  }

  export
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const HEADER: &str = "Gerät,Seriennummer,Gerätezeitstempel,Aufzeichnungstyp,\
Glukosewert-Verlauf mg/dL,Glukose-Scan mg/dL";

  fn export(data_rows: &str) -> String {
    format!("Glukose-Werte,Erstellt am,29-08-2026 10:00 UTC\n{HEADER}\n{data_rows}")
  }

  #[test]
  fn parses_rows_after_preamble_and_header() {
    let input = export(
      "FreeStyle Libre,SN123,01-02-2024 08:30,0,95,\n\
       FreeStyle Libre,SN123,01-02-2024 08:45,1,,102\n",
    );
    let parsed = parse_export(&input);
    assert!(parsed.failures.is_empty());
    assert_eq!(parsed.rows.len(), 2);

    let first = &parsed.rows[0];
    assert_eq!(first.device.as_deref(), Some("FreeStyle Libre"));
    assert_eq!(first.serial_number.as_deref(), Some("SN123"));
    assert_eq!(first.device_timestamp.to_string(), "2024-02-01 08:30:00");
    assert_eq!(first.record_type, Some(0));
    assert_eq!(first.glucose_value, Some(95));
    assert_eq!(first.glucose_scan, None);

    assert_eq!(parsed.rows[1].glucose_value, None);
    assert_eq!(parsed.rows[1].glucose_scan, Some(102));
  }

  #[test]
  fn strips_bom_and_blank_lines() {
    let input = format!(
      "\u{feff}Glukose-Werte\n\n{HEADER}\n\n\
       FreeStyle Libre,SN123,01-02-2024 08:30,0,95,\n\n"
    );
    let parsed = parse_export(&input);
    assert_eq!(parsed.rows.len(), 1);
  }

  #[test]
  fn trims_header_and_values() {
    let input = format!(
      "preamble\n Gerät , Seriennummer , Gerätezeitstempel , Aufzeichnungstyp ,\
 Glukosewert-Verlauf mg/dL , Glukose-Scan mg/dL \n\
       FreeStyle Libre , SN123 , 01-02-2024 08:30 , 0 , 95 , \n"
    );
    let parsed = parse_export(&input);
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].device.as_deref(), Some("FreeStyle Libre"));
    assert_eq!(parsed.rows[0].glucose_value, Some(95));
  }

  #[test]
  fn unparsable_timestamp_is_silently_skipped() {
    let input = export(
      "FreeStyle Libre,SN123,Notiz hinzugefügt,6,,\n\
       FreeStyle Libre,SN123,01-02-2024 08:30,0,95,\n",
    );
    let parsed = parse_export(&input);
    // The event row is neither a row nor a failure.
    assert_eq!(parsed.rows.len(), 1);
    assert!(parsed.failures.is_empty());
  }

  #[test]
  fn bad_integer_is_recorded_as_failure() {
    let input = export(
      "FreeStyle Libre,SN123,01-02-2024 08:30,0,ninety-five,\n\
       FreeStyle Libre,SN123,01-02-2024 08:45,0,96,\n",
    );
    let parsed = parse_export(&input);
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].glucose_value, Some(96));
    assert_eq!(parsed.failures.len(), 1);
    assert_eq!(parsed.failures[0].line_number, 1);
    assert!(parsed.failures[0].row.contains("ninety-five"));
    assert!(matches!(
      parsed.failures[0].error,
      Error::InvalidInteger { column: GLUCOSE_VALUE_COLUMN, .. }
    ));
  }

  #[test]
  fn quoted_fields_may_contain_commas_and_quotes() {
    let input = export(
      "\"Libre, \"\"Gen2\"\"\",SN123,01-02-2024 08:30,0,95,\n",
    );
    let parsed = parse_export(&input);
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].device.as_deref(), Some("Libre, \"Gen2\""));
  }

  #[test]
  fn short_rows_leave_trailing_columns_absent() {
    let input = export("FreeStyle Libre,SN123,01-02-2024 08:30\n");
    let parsed = parse_export(&input);
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].record_type, None);
    assert_eq!(parsed.rows[0].glucose_value, None);
  }

  #[test]
  fn empty_and_header_only_input_yield_nothing() {
    assert!(parse_export("").rows.is_empty());
    assert!(parse_export("preamble only\n").rows.is_empty());
    let parsed = parse_export(&export(""));
    assert!(parsed.rows.is_empty());
    assert!(parsed.failures.is_empty());
  }
}
