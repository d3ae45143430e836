#![allow(dead_code)]

use call_sim_core::config::CampaignConfig;
use call_sim_core::contract::{FieldValue, Lead};
use chrono::NaiveDate;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Jane Doe, lead 42, with only the fields a minimal CRM export carries.
pub fn jane_doe() -> Lead {
    Lead {
        first_name: Some(FieldValue::from("Jane")),
        last_name: Some(FieldValue::from("Doe")),
        lead_id: Some(FieldValue::from(42)),
        phone: Some(FieldValue::from("555-0100")),
        ..Lead::default()
    }
}

/// Two records per lead over the work week of 2023-01-02.
pub fn first_week_config() -> CampaignConfig {
    CampaignConfig {
        records_per_lead_min: 2,
        records_per_lead_max: 2,
        date_range_start: date(2023, 1, 2),
        date_range_end: date(2023, 1, 6),
        ..CampaignConfig::default()
    }
}
