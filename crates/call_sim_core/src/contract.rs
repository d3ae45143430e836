use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const DEFAULT_UNKNOWN: &str = "Unknown";
pub const DEFAULT_LEAD_ID: i64 = 0;

/// A lead attribute as it arrives on the wire: either text or a JSON number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(Number),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

/// One inbound lead. Every attribute is optional; record assembly applies the
/// per-field defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<FieldValue>,
    #[serde(rename = "LeadID", default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_type: Option<FieldValue>,
    #[serde(
        rename = "SubscriberIDFormatted",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub subscriber_id_formatted: Option<FieldValue>,
}

impl Lead {
    /// Identifier used in summaries and logs.
    pub fn display_id(&self) -> String {
        text_or(&self.lead_id, DEFAULT_UNKNOWN)
    }

    /// `"{Address}, {City}, {State}, {Zip}"` with absent parts left empty.
    pub fn formatted_address(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            text_or(&self.address, ""),
            text_or(&self.city, ""),
            text_or(&self.state, ""),
            text_or(&self.zip, ""),
        )
    }
}

pub fn text_or(value: &Option<FieldValue>, default: &str) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| default.to_string())
}

/// One synthetic call attributed to a lead. Field names are the destination
/// table's column names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CallRecord {
    pub date: String,
    pub first_name: String,
    pub last_name: String,
    pub call_notes_formatted: String,
    pub phone: String,
    pub email: String,
    #[serde(rename = "ListID")]
    pub list_id: String,
    pub disposition: String,
    #[serde(rename = "LeadID")]
    pub lead_id: FieldValue,
    pub talk_time_formatted: String,
    pub term_reason_formatted: String,
    #[serde(rename = "SubscriberIDFormatted")]
    pub subscriber_id_formatted: String,
    pub list_description_formatted: String,
    pub source: String,
    pub lead_type: String,
    pub address: String,
}

/// A raw value read from the configuration store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl ConfigValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Null => "null",
        }
    }
}

pub type ConfigDocument = BTreeMap<String, ConfigValue>;

/// Destination table address, rendered as `<dataset>.<table>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

/// A serialized call record ready for a batch insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRow {
    pub insert_id: Option<String>,
    pub json: Map<String, Value>,
}

/// Per-row failure reported by the destination store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowInsertError {
    pub index: usize,
    pub reason: String,
    pub message: String,
}

impl fmt::Display for RowInsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} ({})", self.index, self.message, self.reason)
    }
}
