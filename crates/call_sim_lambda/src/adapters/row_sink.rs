use call_sim_core::contract::{InsertRow, RowInsertError, TableRef};

pub trait RowSink {
    /// Inserts `rows` in one request. `Ok` carries the per-row failures the
    /// store reported; `Err` means the request itself failed.
    fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[InsertRow],
    ) -> Result<Vec<RowInsertError>, String>;
}
