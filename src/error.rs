use thiserror::Error;

/// Everything that can abort a label run.
///
/// Every variant is fatal to the current invocation: no artifact is produced
/// and nothing is written when one of these is returned.
#[derive(Debug, Error)]
pub enum LabelError {
    /// Required columns are absent from the uploaded sheet.
    #[error("uploaded spreadsheet is missing required columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// The delivery-date column holds a value that is not a calendar date.
    #[error("row {row}: cannot parse '{value}' in column '{column}' as a date")]
    DateParseFailure {
        row: usize,
        column: String,
        value: String,
    },

    /// The upload could not be read as a spreadsheet at all.
    #[error("failed to read spreadsheet: {reason}")]
    IngestionFailure { reason: String },

    #[error("labels per row must be between 1 and 3, got {0}")]
    InvalidLabelsPerRow(u8),

    #[error("invalid label schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LabelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_lists_columns() {
        let err = LabelError::SchemaMismatch {
            missing: vec!["计划号".into(), "交货日期".into()],
        };
        assert_eq!(
            err.to_string(),
            "uploaded spreadsheet is missing required columns: 计划号, 交货日期"
        );
    }

    #[test]
    fn test_date_parse_failure_message() {
        let err = LabelError::DateParseFailure {
            row: 4,
            column: "交货日期".into(),
            value: "soon".into(),
        };
        assert!(err.to_string().contains("row 4"));
        assert!(err.to_string().contains("soon"));
    }
}
