//! Runtime integration for synthetic call-record generation.
//!
//! This crate owns the store adapters (DynamoDB configuration documents,
//! BigQuery streaming inserts), inbound event decoding, and the lead handler
//! that wires them to `call_sim_core`.

pub mod adapters;
pub mod events;
pub mod handlers;
pub mod settings;
