use std::collections::HashMap;
use std::sync::Mutex;

use call_sim_core::contract::{ConfigDocument, InsertRow, RowInsertError, TableRef};
use call_sim_lambda::adapters::config_store::ConfigStore;
use call_sim_lambda::adapters::row_sink::RowSink;

/// In-memory configuration documents keyed by `(collection, document)`.
#[derive(Default)]
pub struct MemoryConfigStore {
    documents: HashMap<(String, String), ConfigDocument>,
    reads: Mutex<Vec<(String, String)>>,
}

impl MemoryConfigStore {
    pub fn with_document(mut self, collection: &str, document: &str, values: ConfigDocument) -> Self {
        self.documents
            .insert((collection.to_string(), document.to_string()), values);
        self
    }

    pub fn reads(&self) -> Vec<(String, String)> {
        self.reads.lock().expect("poisoned mutex").clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_document(
        &self,
        collection: &str,
        document: &str,
    ) -> Result<Option<ConfigDocument>, String> {
        let key = (collection.to_string(), document.to_string());
        self.reads.lock().expect("poisoned mutex").push(key.clone());
        Ok(self.documents.get(&key).cloned())
    }
}

pub struct UnavailableConfigStore;

impl ConfigStore for UnavailableConfigStore {
    fn get_document(
        &self,
        _collection: &str,
        _document: &str,
    ) -> Result<Option<ConfigDocument>, String> {
        Err("simulated configuration store outage".to_string())
    }
}

/// Records every batch and rejects rows whose index is listed.
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<(TableRef, Vec<InsertRow>)>>,
    rejected_indexes: Vec<usize>,
}

impl RecordingSink {
    pub fn rejecting(indexes: &[usize]) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            rejected_indexes: indexes.to_vec(),
        }
    }

    pub fn batches(&self) -> Vec<(TableRef, Vec<InsertRow>)> {
        self.batches.lock().expect("poisoned mutex").clone()
    }

    pub fn rows(&self) -> Vec<InsertRow> {
        self.batches()
            .into_iter()
            .flat_map(|(_, rows)| rows)
            .collect()
    }
}

impl RowSink for RecordingSink {
    fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[InsertRow],
    ) -> Result<Vec<RowInsertError>, String> {
        self.batches
            .lock()
            .expect("poisoned mutex")
            .push((table.clone(), rows.to_vec()));

        Ok(self
            .rejected_indexes
            .iter()
            .filter(|index| **index < rows.len())
            .map(|index| RowInsertError {
                index: *index,
                reason: "invalid".to_string(),
                message: format!("simulated rejection of row {index}"),
            })
            .collect())
    }
}

pub struct BrokenSink;

impl RowSink for BrokenSink {
    fn insert_rows(
        &self,
        _table: &TableRef,
        _rows: &[InsertRow],
    ) -> Result<Vec<RowInsertError>, String> {
        Err("simulated insert transport failure".to_string())
    }
}
