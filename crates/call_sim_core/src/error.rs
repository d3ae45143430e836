use chrono::NaiveDate;
use thiserror::Error;

use crate::contract::RowInsertError;

/// Every way a lead invocation can fail. All variants are terminal for the
/// invocation; nothing is retried locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("configuration document '{document}' not found in '{collection}'")]
    ConfigNotFound { collection: String, document: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("date range start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("malformed lead payload: {0}")]
    Decode(String),

    #[error("{} of {attempted} rows rejected by {table}: {}", .errors.len(), join_row_errors(.errors))]
    Insert {
        table: String,
        attempted: usize,
        errors: Vec<RowInsertError>,
    },

    #[error("no weekday between {start} and {end}")]
    NoWeekdayInRange { start: NaiveDate, end: NaiveDate },

    #[error("missing required setting: {0}")]
    MissingConfig(String),

    #[error("store request failed: {0}")]
    Store(String),
}

impl PipelineError {
    /// Stable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::InvalidConfig(_) => "invalid_config",
            Self::InvalidDateRange { .. } => "invalid_date_range",
            Self::Decode(_) => "decode_error",
            Self::Insert { .. } => "insert_error",
            Self::NoWeekdayInRange { .. } => "no_weekday_in_range",
            Self::MissingConfig(_) => "missing_config",
            Self::Store(_) => "store_error",
        }
    }
}

fn join_row_errors(errors: &[RowInsertError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
