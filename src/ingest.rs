//! Spreadsheet ingestion
//!
//! Reads the first worksheet of an `.xlsx`/`.xls` upload, takes the first row
//! as the header and keeps every following row as a [`SourceRow`]. No schema
//! is applied here; that is the job of [`crate::normalize`].

use crate::error::{LabelError, Result};
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::fmt;
use std::io::Cursor;
use std::path::Path;

/// Largest serial Excel accepts (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }

    /// Empty cells and empty strings count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Text printed on a label for this cell.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", *f as i64)
                } else {
                    format!("{}", f)
                }
            }
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
                Some(parsed) => CellValue::DateTime(parsed),
                None => CellValue::Float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(CellValue::DateTime)
                .unwrap_or_else(|_| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        }
    }
}

/// Convert a 1900-system Excel serial (days since 1899-12-30) to a date-time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based spreadsheet row number (the header is row 1)
    pub row_number: usize,
    pub cells: Vec<CellValue>,
}

impl SourceRow {
    pub fn get(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Empty)
    }
}

/// Header plus data rows of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub columns: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Build a table in memory; rows are numbered as if read from a sheet
    /// whose header sits on row 1.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, cells)| SourceRow {
                row_number: idx + 2,
                cells,
            })
            .collect();
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn from_range(range: &Range<Data>) -> Self {
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows_iter = range.rows();

        let columns = match rows_iter.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(idx, cell)| match CellValue::from(cell) {
                    c if c.is_missing() => format!("Unnamed: {}", idx),
                    c => c.display(),
                })
                .collect(),
            None => Vec::new(),
        };

        let rows = rows_iter
            .enumerate()
            .map(|(idx, row)| SourceRow {
                row_number: first_row + idx + 2,
                cells: row.iter().map(CellValue::from).collect(),
            })
            .collect();

        Self { columns, rows }
    }
}

/// Parse an uploaded workbook held in memory.
pub fn read_first_sheet(bytes: &[u8]) -> Result<SourceTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        LabelError::IngestionFailure {
            reason: e.to_string(),
        }
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LabelError::IngestionFailure {
            reason: "workbook contains no worksheets".to_string(),
        })?
        .map_err(|e| LabelError::IngestionFailure {
            reason: e.to_string(),
        })?;

    let table = SourceTable::from_range(&range);
    log::debug!(
        "Read {} columns and {} data rows from first sheet",
        table.columns.len(),
        table.rows.len()
    );
    Ok(table)
}

pub fn read_first_sheet_from_path<P: AsRef<Path>>(path: P) -> Result<SourceTable> {
    let bytes = std::fs::read(&path)?;
    log::info!("Reading spreadsheet {}", path.as_ref().display());
    read_first_sheet(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values() {
        assert!(CellValue::Empty.is_missing());
        assert!(CellValue::text("").is_missing());
        assert!(CellValue::Float(f64::NAN).is_missing());
        assert!(!CellValue::text(" ").is_missing());
        assert!(!CellValue::Int(0).is_missing());
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(CellValue::Float(120.0).display(), "120");
        assert_eq!(CellValue::Float(2.5).display(), "2.5");
        assert_eq!(CellValue::Int(42).display(), "42");
        assert_eq!(CellValue::Bool(true).display(), "TRUE");
    }

    #[test]
    fn test_display_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(CellValue::DateTime(day.and_time(NaiveTime::MIN)).display(), "2024-05-01");
        let noon = day.and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(CellValue::DateTime(noon).display(), "2024-05-01 12:30:00");
    }

    #[test]
    fn test_excel_serial_conversion() {
        let dt = excel_serial_to_datetime(45413.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let half = excel_serial_to_datetime(45413.5).unwrap();
        assert_eq!(half.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert!(excel_serial_to_datetime(0.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_from_calamine_data() {
        assert_eq!(CellValue::from(&Data::String("A-1".into())), CellValue::text("A-1"));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        let iso = CellValue::from(&Data::DateTimeIso("2024-05-01T00:00:00".into()));
        assert_eq!(iso.display(), "2024-05-01");
    }

    #[test]
    fn test_in_memory_rows_are_numbered_after_header() {
        let table = SourceTable::new(
            vec!["a".into()],
            vec![vec![CellValue::Int(1)], vec![CellValue::Int(2)]],
        );
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[1].row_number, 3);
        assert_eq!(table.rows[1].get(5), &CellValue::Empty);
    }

    #[test]
    fn test_garbage_bytes_fail_ingestion() {
        let err = read_first_sheet(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, LabelError::IngestionFailure { .. }));
    }
}
