use std::time::Instant;

use call_sim_core::config::{normalize_config, CampaignConfig};
use call_sim_core::contract::{CallRecord, TableRef};
use call_sim_core::error::PipelineError;
use call_sim_core::generator::{generate_call_records, sample_record_count};
use call_sim_core::payload::decode_lead_payload;
use call_sim_core::rows::{build_insert_rows, summarize_insert, InsertSummary};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::config_store::ConfigStore;
use crate::adapters::row_sink::RowSink;
use crate::events::{decode_lead_messages, LeadMessage};

const COMPONENT: &str = "lead_handler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadHandlerConfig {
    pub collection: String,
    pub document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeadOutcome {
    pub lead_id: String,
    pub records_inserted: usize,
    pub table: String,
}

impl LeadOutcome {
    pub fn summary(&self) -> String {
        format!("Processed LeadID: {}", self.lead_id)
    }
}

/// Reads and normalizes the configuration document. Every call goes to the
/// store; nothing is cached between invocations.
pub fn load_config(
    store: &impl ConfigStore,
    collection: &str,
    document: &str,
) -> Result<CampaignConfig, PipelineError> {
    let raw = store
        .get_document(collection, document)
        .map_err(PipelineError::Store)?
        .ok_or_else(|| PipelineError::ConfigNotFound {
            collection: collection.to_string(),
            document: document.to_string(),
        })?;
    normalize_config(&raw)
}

/// Writes all records in a single batch request. An empty batch is not
/// sent.
pub fn insert_records(
    sink: &impl RowSink,
    records: &[CallRecord],
    table: &TableRef,
    message_id: Option<&str>,
) -> Result<InsertSummary, PipelineError> {
    if records.is_empty() {
        return summarize_insert(table, 0, Vec::new());
    }
    let rows = build_insert_rows(records, message_id)?;
    let row_errors = sink
        .insert_rows(table, &rows)
        .map_err(PipelineError::Store)?;
    summarize_insert(table, rows.len(), row_errors)
}

/// Decode, load configuration, generate, insert. Strictly sequential; the
/// first failure ends the message.
pub fn handle_lead_message<R: Rng + ?Sized>(
    message: &LeadMessage,
    config: &LeadHandlerConfig,
    store: &impl ConfigStore,
    sink: &impl RowSink,
    rng: &mut R,
) -> Result<LeadOutcome, PipelineError> {
    let started_at = Instant::now();

    let lead = decode_lead_payload(&message.data)?;
    let lead_id = lead.display_id();
    info!(
        component = COMPONENT,
        event = "lead_started",
        lead_id = %lead_id,
        message_id = message.message_id.as_deref().unwrap_or(""),
    );

    let result = load_config(store, &config.collection, &config.document).and_then(|campaign| {
        info!(
            component = COMPONENT,
            event = "config_loaded",
            lead_id = %lead_id,
            records_per_lead_min = campaign.records_per_lead_min,
            records_per_lead_max = campaign.records_per_lead_max,
            date_range_start = %campaign.date_range_start,
            date_range_end = %campaign.date_range_end,
        );

        let count = sample_record_count(&campaign, rng);
        let records = generate_call_records(&lead, count, &campaign, rng)?;
        info!(
            component = COMPONENT,
            event = "records_generated",
            lead_id = %lead_id,
            record_count = records.len(),
        );

        let table = campaign.table_ref();
        let summary = insert_records(sink, &records, &table, message.message_id.as_deref())?;
        info!(
            component = COMPONENT,
            event = "records_inserted",
            lead_id = %lead_id,
            table = %summary.table,
            record_count = summary.rows_inserted,
        );
        Ok(summary)
    });

    match result {
        Ok(summary) => {
            let outcome = LeadOutcome {
                lead_id,
                records_inserted: summary.rows_inserted,
                table: summary.table.to_string(),
            };
            info!(
                component = COMPONENT,
                event = "lead_completed",
                lead_id = %outcome.lead_id,
                duration_ms = started_at.elapsed().as_millis() as u64,
            );
            Ok(outcome)
        }
        Err(failure) => {
            error!(
                component = COMPONENT,
                event = "lead_failed",
                lead_id = %lead_id,
                error_code = failure.code(),
                error = %failure,
                duration_ms = started_at.elapsed().as_millis() as u64,
            );
            Err(failure)
        }
    }
}

/// Processes every lead message in the event in order; any failure fails
/// the invocation.
pub fn handle_lead_event<R: Rng + ?Sized>(
    event: &Value,
    config: &LeadHandlerConfig,
    store: &impl ConfigStore,
    sink: &impl RowSink,
    rng: &mut R,
) -> Result<Vec<LeadOutcome>, PipelineError> {
    let messages = decode_lead_messages(event)?;
    let mut outcomes = Vec::with_capacity(messages.len());
    for message in &messages {
        outcomes.push(handle_lead_message(message, config, store, sink, rng)?);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use call_sim_core::config::{
        DATE_RANGE_END, DATE_RANGE_START, RECORDS_PER_LEAD_MAX, RECORDS_PER_LEAD_MIN,
    };
    use call_sim_core::contract::{
        ConfigDocument, ConfigValue, FieldValue, InsertRow, Lead, RowInsertError,
    };
    use call_sim_core::payload::encode_lead_payload;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct MapConfigStore {
        documents: HashMap<(String, String), ConfigDocument>,
        reads: Mutex<usize>,
    }

    impl MapConfigStore {
        fn with(collection: &str, document: &str, values: ConfigDocument) -> Self {
            Self {
                documents: HashMap::from([(
                    (collection.to_string(), document.to_string()),
                    values,
                )]),
                reads: Mutex::new(0),
            }
        }

        fn reads(&self) -> usize {
            *self.reads.lock().expect("poisoned mutex")
        }
    }

    impl ConfigStore for MapConfigStore {
        fn get_document(
            &self,
            collection: &str,
            document: &str,
        ) -> Result<Option<ConfigDocument>, String> {
            *self.reads.lock().expect("poisoned mutex") += 1;
            Ok(self
                .documents
                .get(&(collection.to_string(), document.to_string()))
                .cloned())
        }
    }

    struct CapturingSink {
        batches: Mutex<Vec<(TableRef, Vec<InsertRow>)>>,
    }

    impl CapturingSink {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
            }
        }

        fn batches(&self) -> Vec<(TableRef, Vec<InsertRow>)> {
            self.batches.lock().expect("poisoned mutex").clone()
        }
    }

    impl RowSink for CapturingSink {
        fn insert_rows(
            &self,
            table: &TableRef,
            rows: &[InsertRow],
        ) -> Result<Vec<RowInsertError>, String> {
            self.batches
                .lock()
                .expect("poisoned mutex")
                .push((table.clone(), rows.to_vec()));
            Ok(Vec::new())
        }
    }

    fn handler_config() -> LeadHandlerConfig {
        LeadHandlerConfig {
            collection: "call_sim_config".to_string(),
            document: "default".to_string(),
        }
    }

    fn week_document() -> ConfigDocument {
        ConfigDocument::from([
            (RECORDS_PER_LEAD_MIN.to_string(), ConfigValue::Integer(3)),
            (RECORDS_PER_LEAD_MAX.to_string(), ConfigValue::Integer(3)),
            (
                DATE_RANGE_START.to_string(),
                ConfigValue::Text("2023-01-02".to_string()),
            ),
            (
                DATE_RANGE_END.to_string(),
                ConfigValue::Text("2023-01-06".to_string()),
            ),
        ])
    }

    fn message_for(lead: &Lead, message_id: Option<&str>) -> LeadMessage {
        LeadMessage {
            message_id: message_id.map(str::to_string),
            data: encode_lead_payload(lead).expect("lead should encode"),
        }
    }

    #[test]
    fn writes_one_batch_per_lead() {
        let store = MapConfigStore::with("call_sim_config", "default", week_document());
        let sink = CapturingSink::new();
        let lead = Lead {
            lead_id: Some(FieldValue::from(42)),
            ..Lead::default()
        };

        let outcome = handle_lead_message(
            &message_for(&lead, Some("m-1")),
            &handler_config(),
            &store,
            &sink,
            &mut StdRng::seed_from_u64(1),
        )
        .expect("lead should process");

        assert_eq!(outcome.summary(), "Processed LeadID: 42");
        assert_eq!(outcome.records_inserted, 3);
        assert_eq!(outcome.table, "your_dataset.call_records");

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].1.len(), 3);
        assert!(batches[0].1.iter().all(|row| row.insert_id.is_some()));
    }

    #[test]
    fn missing_config_document_stops_before_insert() {
        let store = MapConfigStore::with("other", "default", week_document());
        let sink = CapturingSink::new();

        let error = handle_lead_message(
            &message_for(&Lead::default(), None),
            &handler_config(),
            &store,
            &sink,
            &mut StdRng::seed_from_u64(1),
        )
        .expect_err("missing document should fail");

        assert_eq!(
            error,
            PipelineError::ConfigNotFound {
                collection: "call_sim_config".to_string(),
                document: "default".to_string(),
            }
        );
        assert!(sink.batches().is_empty());
    }

    #[test]
    fn malformed_payload_fails_before_config_read() {
        let store = MapConfigStore::with("call_sim_config", "default", week_document());
        let sink = CapturingSink::new();
        let message = LeadMessage {
            message_id: None,
            data: "not base64!".to_string(),
        };

        let error = handle_lead_message(
            &message,
            &handler_config(),
            &store,
            &sink,
            &mut StdRng::seed_from_u64(1),
        )
        .expect_err("bad payload should fail");

        assert_eq!(error.code(), "decode_error");
        assert_eq!(store.reads(), 0);
        assert!(sink.batches().is_empty());
    }

    #[test]
    fn configuration_is_reread_for_every_lead() {
        let store = MapConfigStore::with("call_sim_config", "default", week_document());
        let sink = CapturingSink::new();
        let first = load_config(&store, "call_sim_config", "default").expect("first load");
        let second = load_config(&store, "call_sim_config", "default").expect("second load");

        assert_eq!(first, second);
        assert_eq!(store.reads(), 2);
        assert!(sink.batches().is_empty());
    }

    #[test]
    fn empty_batches_are_not_sent() {
        let sink = CapturingSink::new();
        let summary = insert_records(&sink, &[], &TableRef::new("d", "t"), None)
            .expect("empty insert should succeed");
        assert_eq!(summary.rows_inserted, 0);
        assert!(sink.batches().is_empty());
    }
}
