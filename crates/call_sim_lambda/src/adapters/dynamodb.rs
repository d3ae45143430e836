//! Configuration documents stored as DynamoDB items.
//!
//! The collection is the table name and the document name is the value of
//! the table's string partition key.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use call_sim_core::contract::{ConfigDocument, ConfigValue};

use super::config_store::ConfigStore;

pub struct DynamoConfigStore {
    client: aws_sdk_dynamodb::Client,
    key_attribute: String,
}

impl DynamoConfigStore {
    pub fn new(client: aws_sdk_dynamodb::Client, key_attribute: impl Into<String>) -> Self {
        Self {
            client,
            key_attribute: key_attribute.into(),
        }
    }
}

impl ConfigStore for DynamoConfigStore {
    fn get_document(
        &self,
        collection: &str,
        document: &str,
    ) -> Result<Option<ConfigDocument>, String> {
        let client = self.client.clone();
        let table_name = collection.to_string();
        let key_attribute = self.key_attribute.clone();
        let key_value = document.to_string();

        let item = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_item()
                    .table_name(table_name)
                    .key(key_attribute, AttributeValue::S(key_value))
                    .consistent_read(true)
                    .send()
                    .await
                    .map(|output| output.item)
                    .map_err(|error| format!("failed to read configuration item: {error}"))
            })
        })?;

        item.map(|attributes| item_to_document(&attributes))
            .transpose()
    }
}

pub fn item_to_document(item: &HashMap<String, AttributeValue>) -> Result<ConfigDocument, String> {
    item.iter()
        .map(|(name, value)| attribute_to_config_value(name, value).map(|v| (name.clone(), v)))
        .collect()
}

fn attribute_to_config_value(name: &str, value: &AttributeValue) -> Result<ConfigValue, String> {
    match value {
        AttributeValue::S(text) => Ok(ConfigValue::Text(text.clone())),
        AttributeValue::N(number) => parse_number(number)
            .ok_or_else(|| format!("attribute {name} holds unparseable number '{number}'")),
        AttributeValue::Bool(flag) => Ok(ConfigValue::Bool(*flag)),
        AttributeValue::Null(_) => Ok(ConfigValue::Null),
        _ => Err(format!("attribute {name} has an unsupported DynamoDB type")),
    }
}

fn parse_number(raw: &str) -> Option<ConfigValue> {
    let trimmed = raw.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(ConfigValue::Integer(integer));
    }
    trimmed.parse::<f64>().ok().map(ConfigValue::Float)
}
