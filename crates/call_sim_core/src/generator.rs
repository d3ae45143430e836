//! Synthetic call-record generation for a single lead.

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveTime};
use rand::Rng;

use crate::config::{CampaignConfig, TalkTimeSource};
use crate::contract::{text_or, CallRecord, FieldValue, Lead, DEFAULT_LEAD_ID, DEFAULT_UNKNOWN};
use crate::dates::random_weekday;
use crate::error::PipelineError;

/// Disposition abbreviation to display name.
pub const DISPOSITION_MAPPING: [(&str, &str); 7] = [
    ("A", "Answering Machine"),
    ("AA", "Answering Machine Auto"),
    ("AB", "Busy Auto"),
    ("DC", "Disconnected Number"),
    ("N", "No Answer"),
    ("NAU", "No Answer"),
    ("NA", "No Answer Autodial"),
];

pub const TERM_REASONS: [&str; 3] = ["Customer Ended", "Agent Ended", "Timeout"];

pub const TALK_TIME_SECONDS: RangeInclusive<u32> = 30..=600;

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn disposition_display_name(abbreviation: &str) -> Option<&'static str> {
    DISPOSITION_MAPPING
        .iter()
        .find(|(code, _)| *code == abbreviation)
        .map(|(_, display)| *display)
}

/// Uniform draw from `[records_per_lead_min, records_per_lead_max]`.
pub fn sample_record_count<R: Rng + ?Sized>(config: &CampaignConfig, rng: &mut R) -> u32 {
    if config.records_per_lead_min >= config.records_per_lead_max {
        return config.records_per_lead_min;
    }
    rng.gen_range(config.records_per_lead_min..=config.records_per_lead_max)
}

/// Builds `count` independent records for `lead`. Static lead fields are
/// copied as-is; date, talk time, disposition and termination reason are
/// drawn per record.
pub fn generate_call_records<R: Rng + ?Sized>(
    lead: &Lead,
    count: u32,
    config: &CampaignConfig,
    rng: &mut R,
) -> Result<Vec<CallRecord>, PipelineError> {
    let first_name = text_or(&lead.first_name, DEFAULT_UNKNOWN);
    let call_notes = format!(
        "Call with {} {}",
        first_name,
        text_or(&lead.last_name, DEFAULT_UNKNOWN)
    );
    let lead_id = lead
        .lead_id
        .clone()
        .unwrap_or_else(|| FieldValue::from(DEFAULT_LEAD_ID));
    let address = lead.formatted_address();

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let call_date = random_weekday(config.date_range_start, config.date_range_end, rng)?;
        let talk_time_seconds = rng.gen_range(TALK_TIME_SECONDS);
        let (_, disposition) = DISPOSITION_MAPPING[rng.gen_range(0..DISPOSITION_MAPPING.len())];
        let term_reason = TERM_REASONS[rng.gen_range(0..TERM_REASONS.len())];

        let talk_time_formatted = match config.talk_time_source {
            TalkTimeSource::Campaign => config.campaign.clone(),
            TalkTimeSource::Duration => format_talk_time(talk_time_seconds),
        };

        records.push(CallRecord {
            date: format_call_date(call_date),
            first_name: first_name.clone(),
            last_name: text_or(&lead.last_name, ""),
            call_notes_formatted: call_notes.clone(),
            phone: text_or(&lead.phone, DEFAULT_UNKNOWN),
            email: text_or(&lead.email, ""),
            list_id: config.list_id.clone(),
            disposition: disposition.to_string(),
            lead_id: lead_id.clone(),
            talk_time_formatted,
            term_reason_formatted: term_reason.to_string(),
            subscriber_id_formatted: text_or(&lead.subscriber_id_formatted, DEFAULT_UNKNOWN),
            list_description_formatted: config.client_name.clone(),
            source: text_or(&lead.source, ""),
            lead_type: text_or(&lead.lead_type, ""),
            address: address.clone(),
        });
    }

    Ok(records)
}

pub fn format_call_date(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .format(RECORD_DATE_FORMAT)
        .to_string()
}

pub fn format_talk_time(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3_600,
        (seconds % 3_600) / 60,
        seconds % 60
    )
}
