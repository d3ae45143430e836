//! Normalization of the externally managed configuration document.
//!
//! Every field is optional in the store and falls back to its own default.
//! Temporal fields are reduced to plain calendar dates (UTC) before they
//! reach the sampler.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::contract::{ConfigDocument, ConfigValue, TableRef};
use crate::error::PipelineError;

pub const RECORDS_PER_LEAD_MIN: &str = "RECORDS_PER_LEAD_MIN";
pub const RECORDS_PER_LEAD_MAX: &str = "RECORDS_PER_LEAD_MAX";
pub const DATE_RANGE_START: &str = "DATE_RANGE_START";
pub const DATE_RANGE_END: &str = "DATE_RANGE_END";
pub const BQ_DATASET_NAME: &str = "BQ_DATASET_NAME";
pub const BQ_TABLE_NAME: &str = "BQ_TABLE_NAME";
pub const LIST_ID: &str = "LIST_ID";
pub const CLIENT_NAME: &str = "CLIENT_NAME";
pub const CAMPAIGN: &str = "CAMPAIGN";
pub const TALK_TIME_SOURCE: &str = "TALK_TIME_SOURCE";

pub const DEFAULT_RECORDS_PER_LEAD_MIN: u32 = 1;
pub const DEFAULT_RECORDS_PER_LEAD_MAX: u32 = 5;
pub const DEFAULT_DATASET_NAME: &str = "your_dataset";
pub const DEFAULT_TABLE_NAME: &str = "call_records";
pub const DEFAULT_LIST_ID: &str = "DefaultListID";
pub const DEFAULT_CLIENT_NAME: &str = "DefaultClientName";
pub const DEFAULT_CAMPAIGN: &str = "DefaultCampaign";

/// What the `TalkTimeFormatted` column carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TalkTimeSource {
    /// The campaign identifier, matching the existing table contents.
    #[default]
    Campaign,
    /// The sampled talk duration as `HH:MM:SS`.
    Duration,
}

impl TalkTimeSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "campaign" => Some(Self::Campaign),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConfig {
    pub records_per_lead_min: u32,
    pub records_per_lead_max: u32,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
    pub bq_dataset_name: String,
    pub bq_table_name: String,
    pub list_id: String,
    pub client_name: String,
    pub campaign: String,
    pub talk_time_source: TalkTimeSource,
}

impl CampaignConfig {
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.bq_dataset_name.clone(), self.bq_table_name.clone())
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            records_per_lead_min: DEFAULT_RECORDS_PER_LEAD_MIN,
            records_per_lead_max: DEFAULT_RECORDS_PER_LEAD_MAX,
            date_range_start: default_range_start(),
            date_range_end: default_range_end(),
            bq_dataset_name: DEFAULT_DATASET_NAME.to_string(),
            bq_table_name: DEFAULT_TABLE_NAME.to_string(),
            list_id: DEFAULT_LIST_ID.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            campaign: DEFAULT_CAMPAIGN.to_string(),
            talk_time_source: TalkTimeSource::Campaign,
        }
    }
}

fn default_range_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_range_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or(NaiveDate::MIN)
}

pub fn normalize_config(document: &ConfigDocument) -> Result<CampaignConfig, PipelineError> {
    let defaults = CampaignConfig::default();

    let records_per_lead_min =
        count_field(document, RECORDS_PER_LEAD_MIN)?.unwrap_or(defaults.records_per_lead_min);
    let records_per_lead_max =
        count_field(document, RECORDS_PER_LEAD_MAX)?.unwrap_or(defaults.records_per_lead_max);
    if records_per_lead_min > records_per_lead_max {
        return Err(PipelineError::InvalidConfig(format!(
            "{RECORDS_PER_LEAD_MIN}={records_per_lead_min} exceeds {RECORDS_PER_LEAD_MAX}={records_per_lead_max}"
        )));
    }

    let date_range_start =
        date_field(document, DATE_RANGE_START)?.unwrap_or(defaults.date_range_start);
    let date_range_end = date_field(document, DATE_RANGE_END)?.unwrap_or(defaults.date_range_end);
    if date_range_start > date_range_end {
        return Err(PipelineError::InvalidDateRange {
            start: date_range_start,
            end: date_range_end,
        });
    }

    let talk_time_source = match text_field(document, TALK_TIME_SOURCE)? {
        None => defaults.talk_time_source,
        Some(raw) => TalkTimeSource::parse(&raw).ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "{TALK_TIME_SOURCE} must be 'campaign' or 'duration', got '{raw}'"
            ))
        })?,
    };

    Ok(CampaignConfig {
        records_per_lead_min,
        records_per_lead_max,
        date_range_start,
        date_range_end,
        bq_dataset_name: text_field(document, BQ_DATASET_NAME)?
            .unwrap_or(defaults.bq_dataset_name),
        bq_table_name: text_field(document, BQ_TABLE_NAME)?.unwrap_or(defaults.bq_table_name),
        list_id: text_field(document, LIST_ID)?.unwrap_or(defaults.list_id),
        client_name: text_field(document, CLIENT_NAME)?.unwrap_or(defaults.client_name),
        campaign: text_field(document, CAMPAIGN)?.unwrap_or(defaults.campaign),
        talk_time_source,
    })
}

/// Builds a document from a plain JSON object, as used by local previews.
pub fn config_document_from_json(value: &Value) -> Result<ConfigDocument, PipelineError> {
    let object = value.as_object().ok_or_else(|| {
        PipelineError::InvalidConfig("configuration must be a JSON object".to_string())
    })?;

    let mut document = ConfigDocument::new();
    for (key, raw) in object {
        let converted = match raw {
            Value::Null => ConfigValue::Null,
            Value::Bool(flag) => ConfigValue::Bool(*flag),
            Value::String(text) => ConfigValue::Text(text.clone()),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => ConfigValue::Integer(integer),
                None => ConfigValue::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::Array(_) | Value::Object(_) => {
                return Err(PipelineError::InvalidConfig(format!(
                    "{key} must be a scalar value"
                )));
            }
        };
        document.insert(key.clone(), converted);
    }
    Ok(document)
}

fn present<'a>(document: &'a ConfigDocument, key: &str) -> Option<&'a ConfigValue> {
    document
        .get(key)
        .filter(|value| !matches!(value, ConfigValue::Null))
}

fn count_field(document: &ConfigDocument, key: &str) -> Result<Option<u32>, PipelineError> {
    let Some(value) = present(document, key) else {
        return Ok(None);
    };
    let count = match value {
        ConfigValue::Integer(integer) => u32::try_from(*integer).ok(),
        ConfigValue::Float(float) if float.fract() == 0.0 && *float >= 0.0 => {
            u32::try_from(*float as i64).ok()
        }
        _ => None,
    };
    count.map(Some).ok_or_else(|| {
        PipelineError::InvalidConfig(format!(
            "{key} must be a non-negative integer, got {} {value:?}",
            value.kind()
        ))
    })
}

fn date_field(document: &ConfigDocument, key: &str) -> Result<Option<NaiveDate>, PipelineError> {
    let Some(value) = present(document, key) else {
        return Ok(None);
    };
    let date = match value {
        ConfigValue::Text(text) => parse_calendar_date(text),
        ConfigValue::Integer(epoch_seconds) => {
            DateTime::<Utc>::from_timestamp(*epoch_seconds, 0).map(|moment| moment.date_naive())
        }
        _ => None,
    };
    date.map(Some).ok_or_else(|| {
        PipelineError::InvalidConfig(format!(
            "{key} must be a date, timestamp or epoch seconds, got {value:?}"
        ))
    })
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; the time of day and offset
/// are dropped after converting to UTC.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|moment| moment.with_timezone(&Utc).date_naive())
        })
}

fn text_field(document: &ConfigDocument, key: &str) -> Result<Option<String>, PipelineError> {
    match present(document, key) {
        None => Ok(None),
        Some(ConfigValue::Text(text)) => Ok(Some(text.clone())),
        Some(ConfigValue::Integer(integer)) => Ok(Some(integer.to_string())),
        Some(ConfigValue::Float(float)) => Ok(Some(float.to_string())),
        Some(other) => Err(PipelineError::InvalidConfig(format!(
            "{key} must be text, got {}",
            other.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn document(entries: &[(&str, ConfigValue)]) -> ConfigDocument {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = normalize_config(&ConfigDocument::new()).expect("defaults should apply");
        assert_eq!(config, CampaignConfig::default());
        assert_eq!(config.records_per_lead_min, 1);
        assert_eq!(config.records_per_lead_max, 5);
        assert_eq!(config.date_range_start, date(2023, 1, 1));
        assert_eq!(config.date_range_end, date(2023, 12, 31));
        assert_eq!(config.table_ref().to_string(), "your_dataset.call_records");
    }

    #[test]
    fn timestamps_are_reduced_to_utc_dates() {
        let config = normalize_config(&document(&[
            (
                DATE_RANGE_START,
                ConfigValue::Text("2024-03-01T23:30:00-05:00".to_string()),
            ),
            (DATE_RANGE_END, ConfigValue::Text("2024-03-31".to_string())),
        ]))
        .expect("config should normalize");

        assert_eq!(config.date_range_start, date(2024, 3, 2));
        assert_eq!(config.date_range_end, date(2024, 3, 31));
    }

    #[test]
    fn epoch_seconds_are_accepted_for_dates() {
        let config = normalize_config(&document(&[
            (DATE_RANGE_START, ConfigValue::Integer(1_672_617_600)),
            (DATE_RANGE_END, ConfigValue::Integer(1_672_999_200)),
        ]))
        .expect("config should normalize");

        assert_eq!(config.date_range_start, date(2023, 1, 2));
        assert_eq!(config.date_range_end, date(2023, 1, 6));
    }

    #[test]
    fn fields_default_independently() {
        let config = normalize_config(&document(&[
            (RECORDS_PER_LEAD_MAX, ConfigValue::Integer(9)),
            (CAMPAIGN, ConfigValue::Text("Spring".to_string())),
            (LIST_ID, ConfigValue::Integer(1001)),
            (CLIENT_NAME, ConfigValue::Null),
        ]))
        .expect("config should normalize");

        assert_eq!(config.records_per_lead_min, 1);
        assert_eq!(config.records_per_lead_max, 9);
        assert_eq!(config.campaign, "Spring");
        assert_eq!(config.list_id, "1001");
        assert_eq!(config.client_name, DEFAULT_CLIENT_NAME);
    }

    #[test]
    fn rejects_inverted_count_bounds() {
        let error = normalize_config(&document(&[
            (RECORDS_PER_LEAD_MIN, ConfigValue::Integer(6)),
            (RECORDS_PER_LEAD_MAX, ConfigValue::Integer(2)),
        ]))
        .expect_err("min above max should fail");
        assert_eq!(error.code(), "invalid_config");
    }

    #[test]
    fn rejects_negative_counts() {
        let error = normalize_config(&document(&[(
            RECORDS_PER_LEAD_MIN,
            ConfigValue::Integer(-1),
        )]))
        .expect_err("negative count should fail");
        assert!(error.to_string().contains(RECORDS_PER_LEAD_MIN));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let error = normalize_config(&document(&[
            (DATE_RANGE_START, ConfigValue::Text("2023-02-01".to_string())),
            (DATE_RANGE_END, ConfigValue::Text("2023-01-01".to_string())),
        ]))
        .expect_err("inverted range should fail");
        assert_eq!(
            error,
            PipelineError::InvalidDateRange {
                start: date(2023, 2, 1),
                end: date(2023, 1, 1),
            }
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        let error = normalize_config(&document(&[(
            DATE_RANGE_START,
            ConfigValue::Text("next tuesday".to_string()),
        )]))
        .expect_err("garbage date should fail");
        assert!(error.to_string().contains(DATE_RANGE_START));
    }

    #[test]
    fn talk_time_source_is_parsed() {
        let config = normalize_config(&document(&[(
            TALK_TIME_SOURCE,
            ConfigValue::Text("Duration".to_string()),
        )]))
        .expect("config should normalize");
        assert_eq!(config.talk_time_source, TalkTimeSource::Duration);

        let error = normalize_config(&document(&[(
            TALK_TIME_SOURCE,
            ConfigValue::Text("seconds".to_string()),
        )]))
        .expect_err("unknown source should fail");
        assert_eq!(error.code(), "invalid_config");
    }

    #[test]
    fn json_documents_convert_scalars() {
        let value = serde_json::json!({
            "RECORDS_PER_LEAD_MIN": 2,
            "CAMPAIGN": "Spring",
            "ENABLED": true,
            "RATIO": 0.5,
            "MISSING": null
        });
        let document = config_document_from_json(&value).expect("document should convert");
        assert_eq!(document[RECORDS_PER_LEAD_MIN], ConfigValue::Integer(2));
        assert_eq!(document[CAMPAIGN], ConfigValue::Text("Spring".to_string()));
        assert_eq!(document["ENABLED"], ConfigValue::Bool(true));
        assert_eq!(document["RATIO"], ConfigValue::Float(0.5));
        assert_eq!(document["MISSING"], ConfigValue::Null);

        let nested = serde_json::json!({"CAMPAIGN": ["a"]});
        assert!(config_document_from_json(&nested).is_err());
    }
}
