//! Uniform JSON response envelope.
//!
//! Every response body, success or failure, has the shape
//! `{status, data, error, metadata: {timestamp}}`.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub timestamp: String,
}

impl Metadata {
    fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub metadata: Metadata,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            error: None,
            metadata: Metadata::now(),
        }
    }
}

impl Envelope<()> {
    pub fn failure(code: impl Into<String>, message: impl Into<String>, details: Value) -> Self {
        Self {
            status: Status::Error,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
                details,
            }),
            metadata: Metadata::now(),
        }
    }
}
