use chrono::NaiveDate;
use thiserror::Error;

/// Fatal failure while turning a source into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: '{value}' is not a valid {column} date")]
    InvalidDate {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: '{value}' is not a valid number for '{column}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: missing value for '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType {
        column: &'static str,
        data_type: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("writing export file: {0}")]
    Io(#[from] std::io::Error),
}
