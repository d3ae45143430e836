//! Process-level settings, read once at cold start.
//!
//! Required values that are missing or blank fail startup with
//! `MissingConfig` instead of leaking a placeholder into store lookups.

use call_sim_core::error::PipelineError;

use crate::adapters::bigquery::DEFAULT_BIGQUERY_ENDPOINT;

pub const CONFIG_COLLECTION: &str = "CONFIG_COLLECTION";
pub const CONFIG_DOCUMENT: &str = "CONFIG_DOCUMENT";
pub const CONFIG_KEY_ATTRIBUTE: &str = "CONFIG_KEY_ATTRIBUTE";
pub const BQ_PROJECT_ID: &str = "BQ_PROJECT_ID";
pub const BQ_ACCESS_TOKEN: &str = "BQ_ACCESS_TOKEN";
pub const BQ_API_ENDPOINT: &str = "BQ_API_ENDPOINT";
pub const CALL_SIM_SEED: &str = "CALL_SIM_SEED";

pub const DEFAULT_CONFIG_KEY_ATTRIBUTE: &str = "id";

#[derive(Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub config_collection: String,
    pub config_document: String,
    pub config_key_attribute: String,
    pub bigquery_project_id: String,
    pub bigquery_access_token: String,
    pub bigquery_endpoint: String,
    pub seed: Option<u64>,
}

impl std::fmt::Debug for RuntimeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeSettings")
            .field("config_collection", &self.config_collection)
            .field("config_document", &self.config_document)
            .field("config_key_attribute", &self.config_key_attribute)
            .field("bigquery_project_id", &self.bigquery_project_id)
            .field("bigquery_access_token", &"<redacted>")
            .field("bigquery_endpoint", &self.bigquery_endpoint)
            .field("seed", &self.seed)
            .finish()
    }
}

impl RuntimeSettings {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let required = |name: &str| -> Result<String, PipelineError> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| PipelineError::MissingConfig(format!("{name} must be configured")))
        };
        let optional = |name: &str, default: &str| -> String {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let seed = match lookup(CALL_SIM_SEED).map(|value| value.trim().to_string()) {
            None => None,
            Some(raw) if raw.is_empty() => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                PipelineError::MissingConfig(format!(
                    "{CALL_SIM_SEED} must be an unsigned integer, got '{raw}'"
                ))
            })?),
        };

        Ok(Self {
            config_collection: required(CONFIG_COLLECTION)?,
            config_document: required(CONFIG_DOCUMENT)?,
            config_key_attribute: optional(CONFIG_KEY_ATTRIBUTE, DEFAULT_CONFIG_KEY_ATTRIBUTE),
            bigquery_project_id: required(BQ_PROJECT_ID)?,
            bigquery_access_token: required(BQ_ACCESS_TOKEN)?,
            bigquery_endpoint: optional(BQ_API_ENDPOINT, DEFAULT_BIGQUERY_ENDPOINT),
            seed,
        })
    }
}
