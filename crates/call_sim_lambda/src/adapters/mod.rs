pub mod bigquery;
pub mod config_store;
pub mod dynamodb;
pub mod row_sink;
