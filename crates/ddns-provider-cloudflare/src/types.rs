//! Cloudflare API v4 wire types

use ddns_core::{Error, Record, RecordType, Result, Zone};
use serde::Deserialize;

use crate::PROVIDER_NAME;

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    pub result: Option<T>,
}

/// Entry of `messages[]`: Cloudflare sends either bare strings or objects
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiMessage {
    Text(String),
    Detailed {
        #[serde(default)]
        code: Option<i64>,
        message: String,
    },
}

impl ApiMessage {
    fn text(&self) -> String {
        match self {
            ApiMessage::Text(text) => text.clone(),
            ApiMessage::Detailed {
                code: Some(code),
                message,
            } => format!("{} (code {})", message, code),
            ApiMessage::Detailed { message, .. } => message.clone(),
        }
    }
}

/// Entry of `errors[]`
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

impl<T> ApiEnvelope<T> {
    /// Provider messages joined for logging
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .chain(self.messages.iter().map(ApiMessage::text))
            .collect();

        if parts.is_empty() {
            "no error message returned".to_string()
        } else {
            parts.join("; ")
        }
    }

    /// `success: false` becomes `Error::Provider`
    pub fn into_result(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.result)
        } else {
            Err(Error::provider(PROVIDER_NAME, self.describe()))
        }
    }
}

/// `result[]` item of `GET zones`
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneResult {
    pub id: String,
    pub name: String,
}

impl From<ZoneResult> for Zone {
    fn from(zone: ZoneResult) -> Self {
        Zone {
            id: zone.id,
            name: zone.name,
        }
    }
}

/// `result[]` item of `GET zones/{zone}/dns_records`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordResult {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub modified_on: Option<String>,
}

impl From<RecordResult> for Record {
    fn from(record: RecordResult) -> Self {
        Record {
            id: record.id,
            record_type: record.record_type,
            name: record.name,
            content: record.content,
            proxied: record.proxied,
            created_on: record.created_on.unwrap_or_default(),
            modified_on: record.modified_on.unwrap_or_default(),
        }
    }
}

/// Record id echoed in a write response, if there is one
///
/// Write replies are only checked for `success`; `result` may be a record,
/// a partial object, an empty list or absent.
pub fn written_record_id(result: &serde_json::Value) -> Option<&str> {
    match result {
        serde_json::Value::Object(map) => map.get("id").and_then(|id| id.as_str()),
        serde_json::Value::Array(items) => items.first().and_then(written_record_id),
        _ => None,
    }
}
