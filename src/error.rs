use thiserror::Error;

use crate::models::RecordId;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("position {position} is out of range (store has {len} records)")]
    OutOfRange { position: usize, len: usize },

    #[error("record {0} no longer exists")]
    UnknownRecord(RecordId),

    #[error("row {row}: {message}")]
    Decode { row: usize, message: String },

    #[error("missing expected column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Rejected form input. Raised before anything reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("{field} cannot exceed 1000000000000")]
    TooLarge { field: &'static str },

    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("'{0}' is not a date (use YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("unknown currency '{0}'")]
    UnknownCurrency(String),

    #[error("unknown status '{0}' (use paid or unpaid)")]
    UnknownStatus(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
}

pub(crate) type StoreResult<T> = std::result::Result<T, StoreError>;
