//! Row serialization and insert-result interpretation for the batch writer.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::contract::{CallRecord, InsertRow, RowInsertError, TableRef};
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertSummary {
    pub table: TableRef,
    pub rows_inserted: usize,
}

impl fmt::Display for InsertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successfully inserted {} rows.", self.rows_inserted)
    }
}

/// Deterministic per-row insert id so a redelivered message maps onto the
/// same ids as its first delivery.
pub fn row_insert_id(message_id: &str, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{message_id}:{index}"));
    format!("{:x}", hasher.finalize())
}

pub fn build_insert_rows(
    records: &[CallRecord],
    message_id: Option<&str>,
) -> Result<Vec<InsertRow>, PipelineError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let json = match serde_json::to_value(record) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    return Err(PipelineError::Store(format!(
                        "call record {index} serialized to non-object {other}"
                    )))
                }
                Err(error) => {
                    return Err(PipelineError::Store(format!(
                        "failed to serialize call record {index}: {error}"
                    )))
                }
            };
            Ok(InsertRow {
                insert_id: message_id.map(|id| row_insert_id(id, index)),
                json,
            })
        })
        .collect()
}

/// Any reported row failure fails the whole batch; callers cannot tell which
/// of the remaining rows were persisted.
pub fn summarize_insert(
    table: &TableRef,
    attempted: usize,
    errors: Vec<RowInsertError>,
) -> Result<InsertSummary, PipelineError> {
    if !errors.is_empty() {
        return Err(PipelineError::Insert {
            table: table.to_string(),
            attempted,
            errors,
        });
    }
    Ok(InsertSummary {
        table: table.clone(),
        rows_inserted: attempted,
    })
}
