//! Inbound event envelopes carrying base64 lead payloads.

use call_sim_core::error::PipelineError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadMessage {
    pub message_id: Option<String>,
    pub data: String,
}

/// Accepts either a push envelope (`{"message": {"data": ...}}`) or a queue
/// batch (`{"Records": [{"eventSource": "aws:sqs", "body": ...}]}`).
pub fn decode_lead_messages(event: &Value) -> Result<Vec<LeadMessage>, PipelineError> {
    if let Some(message) = event.get("message") {
        return decode_push_message(message).map(|message| vec![message]);
    }
    if is_sqs_event(event) {
        return decode_sqs_records(event);
    }
    Err(PipelineError::Decode(
        "event must be a push envelope or an SQS batch".to_string(),
    ))
}

fn decode_push_message(message: &Value) -> Result<LeadMessage, PipelineError> {
    let data = message
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| PipelineError::Decode("message.data must be a string".to_string()))?;
    let message_id = message
        .get("messageId")
        .or_else(|| message.get("message_id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(LeadMessage {
        message_id,
        data: data.to_string(),
    })
}

pub fn is_sqs_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == "aws:sqs")
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}

fn decode_sqs_records(event: &Value) -> Result<Vec<LeadMessage>, PipelineError> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Decode("SQS event must include Records array".to_string()))?;

    let mut messages = Vec::with_capacity(records.len());
    for record in records {
        let body = record
            .get("body")
            .and_then(Value::as_str)
            .ok_or_else(|| PipelineError::Decode("SQS record body must be a string".to_string()))?;
        messages.push(LeadMessage {
            message_id: record
                .get("messageId")
                .and_then(Value::as_str)
                .map(str::to_string),
            data: body.to_string(),
        });
    }

    Ok(messages)
}
