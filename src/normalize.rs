//! Validation and normalization of ingested rows
//!
//! Turns a [`SourceTable`] into a [`FilteredRowSet`]:
//!
//! 1. every required column must exist, otherwise [`LabelError::SchemaMismatch`]
//! 2. rows are dropped according to the schema's [`RowFilter`]
//! 3. the delivery date is rewritten as `YYYY-MM-DD` when the schema asks for it
//!
//! The transform is pure and idempotent: feeding the output back in through
//! [`FilteredRowSet::to_source_table`] yields the same set.

use crate::error::{LabelError, Result};
use crate::ingest::{CellValue, SourceRow, SourceTable, excel_serial_to_datetime};
use crate::schema::{FieldSpec, LabelSchema, RowFilter};
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

// 2024-05-01, 2024/5/1, 2024.5.1, 2024年5月1日, optionally followed by a 24h or AM/PM time
static YMD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})\s*[-/.年]\s*(\d{1,2})\s*[-/.月]\s*(\d{1,2})\s*日?(?:[ T]+\d{1,2}:\d{1,2}(?::\d{1,2}(?:\.\d+)?)?(?:\s*[AaPp][Mm])?)?$",
    )
    .unwrap()
});
// Month-name spellings tried after the numeric shapes
const NAMED_MONTH_FORMATS: [&str; 5] = ["%B %d, %Y", "%b %d %Y", "%d %B %Y", "%d-%b-%Y", "%d %b, %Y"];

static COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());
// 5/1/2024 is read month first
static MDY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:\s+\d{1,2}:\d{1,2}(?::\d{1,2})?)?$").unwrap()
});

/// One row that passed validation, projected onto the required field order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRow {
    pub source_row: usize,
    pub values: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRowSet {
    pub fields: Vec<FieldSpec>,
    pub rows: Vec<FilteredRow>,
}

impl FilteredRowSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("Found {} records", self.rows.len())
    }

    /// Plain-text table of the first `limit` rows.
    pub fn preview(&self, limit: usize) -> String {
        let header: Vec<String> = self.fields.iter().map(|f| f.column.clone()).collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(limit)
            .map(|row| row.values.iter().map(CellValue::display).collect())
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        let format_row = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width - cell.chars().count();
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&format_row(&header));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
        out.push_str(&rule.join("-+-"));
        out.push('\n');
        for row in &body {
            out.push_str(&format_row(row));
            out.push('\n');
        }
        out
    }

    /// Rebuild a source table whose columns are exactly the required fields.
    pub fn to_source_table(&self) -> SourceTable {
        SourceTable {
            columns: self.fields.iter().map(|f| f.column.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| SourceRow {
                    row_number: row.source_row,
                    cells: row.values.clone(),
                })
                .collect(),
        }
    }
}

/// Locate every required column, or report all of the missing ones.
pub fn check_columns(table: &SourceTable, schema: &LabelSchema) -> Result<Vec<usize>> {
    let mut indices = Vec::with_capacity(schema.fields.len());
    let mut missing = Vec::new();
    for field in &schema.fields {
        match table.column_index(&field.column) {
            Some(idx) => indices.push(idx),
            None => missing.push(field.column.clone()),
        }
    }
    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(LabelError::SchemaMismatch { missing })
    }
}

/// Parse a cell as a calendar date. Returns `None` for anything unparseable.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Int(_) | CellValue::Float(_) => {
            let text = value.display();
            parse_date_text(&text).or_else(|| match value {
                CellValue::Int(i) => excel_serial_to_datetime(*i as f64).map(|dt| dt.date()),
                CellValue::Float(f) => excel_serial_to_datetime(*f).map(|dt| dt.date()),
                _ => None,
            })
        }
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let ymd = |y: &str, m: &str, d: &str| -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
    };

    if let Some(caps) = YMD_RE.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = COMPACT_RE.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = MDY_RE.captures(text) {
        return ymd(&caps[3], &caps[1], &caps[2]);
    }
    if let Some(date) = NAMED_MONTH_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }
    // 2024-05-01T08:30:00Z, 2024-05-01T08:30:00+08:00: the date as written, not shifted to UTC
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
        .map(|dt| dt.date_naive())
}

fn keep_row(values: &[CellValue], filter: &RowFilter, schema: &LabelSchema) -> bool {
    match filter {
        RowFilter::AllEmpty => values.iter().any(|v| !v.is_missing()),
        RowFilter::KeyMissing { field } => schema
            .position_of(field)
            .is_some_and(|pos| !values[pos].is_missing()),
    }
}

/// Validate a table against a schema and produce the filtered, normalized rows.
pub fn validate_and_normalize(table: &SourceTable, schema: &LabelSchema) -> Result<FilteredRowSet> {
    schema.validate()?;
    let indices = check_columns(table, schema)?;
    let date_position = if schema.normalize_dates {
        schema.date_position()
    } else {
        None
    };

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for source in &table.rows {
        let mut values: Vec<CellValue> = indices.iter().map(|&idx| source.get(idx).clone()).collect();

        if !keep_row(&values, &schema.row_filter, schema) {
            dropped += 1;
            continue;
        }

        if let Some(pos) = date_position {
            let value = &values[pos];
            if !value.is_missing() {
                let date = parse_date(value).ok_or_else(|| LabelError::DateParseFailure {
                    row: source.row_number,
                    column: schema.fields[pos].column.clone(),
                    value: value.display(),
                })?;
                values[pos] = CellValue::Text(date.format("%Y-%m-%d").to_string());
            }
        }

        rows.push(FilteredRow {
            source_row: source.row_number,
            values,
        });
    }

    log::debug!(
        "Schema '{}': kept {} rows, dropped {}",
        schema.name,
        rows.len(),
        dropped
    );

    Ok(FilteredRowSet {
        fields: schema.fields.clone(),
        rows,
    })
}
