//! BigQuery streaming inserts (`tabledata.insertAll`) over REST.

use call_sim_core::contract::{InsertRow, RowInsertError, TableRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::row_sink::RowSink;

pub const DEFAULT_BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com";

pub struct BigQueryRowSink {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRequest<'a> {
    kind: &'static str,
    skip_invalid_rows: bool,
    ignore_unknown_values: bool,
    rows: Vec<InsertAllRow<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    insert_id: Option<&'a str>,
    json: &'a Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<InsertErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct InsertErrorEntry {
    #[serde(default)]
    index: usize,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

impl BigQueryRowSink {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn insert_all_url(&self, table: &TableRef) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}/insertAll",
            self.endpoint.trim_end_matches('/'),
            self.project_id,
            table.dataset,
            table.table,
        )
    }
}

impl RowSink for BigQueryRowSink {
    fn insert_rows(
        &self,
        table: &TableRef,
        rows: &[InsertRow],
    ) -> Result<Vec<RowInsertError>, String> {
        let request = InsertAllRequest {
            kind: "bigquery#tableDataInsertAllRequest",
            skip_invalid_rows: false,
            ignore_unknown_values: false,
            rows: rows
                .iter()
                .map(|row| InsertAllRow {
                    insert_id: row.insert_id.as_deref(),
                    json: &row.json,
                })
                .collect(),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|error| format!("failed to serialize insertAll request: {error}"))?;

        let client = self.client.clone();
        let url = self.insert_all_url(table);
        let token = self.access_token.clone();

        let response = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(post_insert_all(client, url, token, body))
        })?;

        Ok(flatten_insert_errors(response.insert_errors))
    }
}

async fn post_insert_all(
    client: reqwest::Client,
    url: String,
    token: String,
    body: Vec<u8>,
) -> Result<InsertAllResponse, String> {
    let response = client
        .post(url)
        .bearer_auth(token)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|error| format!("insertAll request failed: {error}"))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|error| format!("failed to read insertAll response: {error}"))?;
    if !status.is_success() {
        return Err(format!("insertAll returned {status}: {text}"));
    }
    if text.trim().is_empty() {
        return Ok(InsertAllResponse::default());
    }
    serde_json::from_str(&text).map_err(|error| format!("invalid insertAll response: {error}"))
}

fn flatten_insert_errors(entries: Vec<InsertErrorEntry>) -> Vec<RowInsertError> {
    let mut flattened = Vec::new();
    for entry in entries {
        if entry.errors.is_empty() {
            flattened.push(RowInsertError {
                index: entry.index,
                reason: "unknown".to_string(),
                message: "row rejected without detail".to_string(),
            });
            continue;
        }
        for error in entry.errors {
            flattened.push(RowInsertError {
                index: entry.index,
                reason: error.reason,
                message: error.message,
            });
        }
    }
    flattened
}
