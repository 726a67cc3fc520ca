//! Mapping between lightspeed types and the backend's JSON shapes.
//!
//! History comes back as an array of serialized chat messages:
//!
//! ```json
//! [
//!   { "kwargs": { "content": "hi" } },
//!   { "kwargs": { "content": "hello", "response_metadata": { "model": "granite", "created_at": 1714566600 } } }
//! ]
//! ```

use lightspeed_types::{ApiError, CreateMessageRequest, HistoryRecord, parse_timestamp};
use serde_json::{Value, json};

/// Build the `/v1/query` body for a prompt submission.
#[must_use]
pub fn to_query_body(request: &CreateMessageRequest, server_url: Option<&str>) -> Value {
    let mut body = json!({
        "conversation_id": request.conversation_id,
        "model": request.model,
        "query": request.prompt,
    });
    if let Some(url) = server_url {
        body["serverURL"] = Value::String(url.to_string());
    }
    body
}

/// Decode a conversation history response body.
pub fn from_history_response(body: &Value) -> Result<Vec<HistoryRecord>, ApiError> {
    let records = body
        .as_array()
        .ok_or_else(|| ApiError::InvalidResponse("history response is not an array".into()))?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.is_object() {
                return Err(ApiError::InvalidResponse(format!(
                    "history record {index} is not an object"
                )));
            }
            Ok(map_record(record))
        })
        .collect()
}

fn map_record(record: &Value) -> HistoryRecord {
    let kwargs = &record["kwargs"];
    let metadata = &kwargs["response_metadata"];
    HistoryRecord {
        content: kwargs["content"].as_str().unwrap_or_default().to_string(),
        timestamp: parse_timestamp(&metadata["created_at"]),
        model: metadata["model"].as_str().map(str::to_string),
    }
}
