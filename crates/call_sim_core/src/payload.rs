//! Wire codec for inbound lead payloads: base64 text wrapping a JSON object.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::contract::Lead;
use crate::error::PipelineError;

pub fn decode_lead_payload(data: &str) -> Result<Lead, PipelineError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|error| PipelineError::Decode(format!("invalid base64: {error}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|error| PipelineError::Decode(format!("invalid UTF-8: {error}")))?;
    decode_lead_json(&text)
}

pub fn decode_lead_json(text: &str) -> Result<Lead, PipelineError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|error| PipelineError::Decode(format!("invalid JSON: {error}")))?;
    if !value.is_object() {
        return Err(PipelineError::Decode(
            "lead payload must be a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|error| PipelineError::Decode(format!("unsupported lead field value: {error}")))
}

pub fn encode_lead_payload(lead: &Lead) -> Result<String, PipelineError> {
    let json = serde_json::to_vec(lead)
        .map_err(|error| PipelineError::Decode(format!("lead is not serializable: {error}")))?;
    Ok(STANDARD.encode(json))
}
