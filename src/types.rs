use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Body of an accepted request.
///
/// JSON bodies keep their structure; anything else is kept verbatim as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Json(_) => "json",
            Payload::Text(_) => "text",
        }
    }

    /// Text previews are cut at `max_chars` characters and suffixed with `...`.
    /// JSON payloads are pretty printed in full.
    pub fn preview(&self, max_chars: usize) -> String {
        match self {
            Payload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Payload::Text(text) => truncate_chars(text, max_chars),
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One received request, as held in the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionRecord {
    /// 1-based position in the log
    pub id: usize,
    pub timestamp: DateTime<Utc>,
    pub source_address: String,
    pub payload: Payload,
}

/// What to do with a body that is missing or not decodable as JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PayloadPolicy {
    /// Store the raw body as a text record
    #[default]
    AcceptAsText,
    /// Answer 400 and leave the log untouched
    Reject,
}

impl std::str::FromStr for PayloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "accept_as_text" | "accept" | "text" => Ok(PayloadPolicy::AcceptAsText),
            "reject" => Ok(PayloadPolicy::Reject),
            other => Err(format!("unknown payload policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Info,
    Error,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub record_id: usize,
}

impl IngestResponse {
    pub fn accepted(record_id: usize) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: "Payload received and stored.".to_string(),
            record_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<IngestionRecord>>,
}

impl QueryResponse {
    pub fn from_records(records: Vec<IngestionRecord>) -> Self {
        if records.is_empty() {
            return Self {
                status: ResponseStatus::Info,
                message: Some("No data stored yet.".to_string()),
                count: 0,
                data: None,
            };
        }
        Self {
            status: ResponseStatus::Success,
            message: None,
            count: records.len(),
            data: Some(records),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub status: ResponseStatus,
    pub data: IngestionRecord,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: ResponseStatus,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_serializes_without_a_tag() {
        let json = serde_json::to_value(Payload::Json(json!({"a": 1}))).unwrap();
        assert_eq!(json, json!({"a": 1}));

        let text = serde_json::to_value(Payload::Text("hello".into())).unwrap();
        assert_eq!(text, json!("hello"));
    }

    #[test]
    fn text_preview_is_truncated_on_char_boundaries() {
        let payload = Payload::Text("héllo wörld".into());
        assert_eq!(payload.preview(5), "héllo...");
        assert_eq!(payload.preview(50), "héllo wörld");
    }

    #[test]
    fn empty_log_query_is_informational() {
        let body = serde_json::to_value(QueryResponse::from_records(Vec::new())).unwrap();
        assert_eq!(body["status"], "info");
        assert_eq!(body["count"], 0);
        assert!(body.get("data").is_none());
    }

    #[test]
    fn policy_parses_from_loose_spellings() {
        assert_eq!("reject".parse::<PayloadPolicy>(), Ok(PayloadPolicy::Reject));
        assert_eq!(
            "Accept-As-Text".parse::<PayloadPolicy>(),
            Ok(PayloadPolicy::AcceptAsText)
        );
        assert!("drop".parse::<PayloadPolicy>().is_err());
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: PayloadPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"reject\"").unwrap();
        assert_eq!(w.policy, PayloadPolicy::Reject);
    }
}
