//! Action log entries and their classification.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::resilience::{latency_ms, RequestError};

/// Outcome recorded for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// An HTTP status was received.
    Status(u16),
    /// Timeout or transport failure.
    Err,
    /// Nothing to report (e.g. a failover notice).
    None,
}

impl ResultCode {
    /// Classification rule, in priority order: `ERR`, >= 500, [400, 500), everything else.
    pub fn classify(self) -> Class {
        match self {
            ResultCode::Err => Class::Err,
            ResultCode::Status(code) if code >= 500 => Class::Err,
            ResultCode::Status(code) if code >= 400 => Class::Warn,
            _ => Class::Ok,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Status(code) => write!(f, "{}", code),
            ResultCode::Err => f.write_str("ERR"),
            ResultCode::None => f.write_str("—"),
        }
    }
}

impl Serialize for ResultCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultCode::Status(code) => serializer.serialize_u16(*code),
            ResultCode::Err => serializer.serialize_str("ERR"),
            ResultCode::None => serializer.serialize_none(),
        }
    }
}

/// Derived outcome class of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    Ok,
    Warn,
    Err,
}

impl Class {
    pub fn as_str(self) -> &'static str {
        match self {
            Class::Ok => "ok",
            Class::Warn => "warn",
            Class::Err => "err",
        }
    }
}

/// Label used for entries synthesized from failover notices.
pub const FAILOVER_ACTION: &str = "FAILOVER";

/// One immutable, user-visible record of an operation and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ActionEntry {
    pub id: Uuid,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub action: String,
    pub code: ResultCode,
    /// Target that served the request, empty when unknown.
    pub served_by: String,
    pub latency_ms: Option<u64>,
    pub detail: Option<String>,
    pub class: Class,
}

impl ActionEntry {
    pub fn new(action: impl Into<String>, code: ResultCode) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            id: Uuid::new_v4(),
            timestamp_ms,
            action: action.into(),
            code,
            served_by: String::new(),
            latency_ms: None,
            detail: None,
            class: code.classify(),
        }
    }

    /// Entry for a request that failed before any response arrived.
    pub fn failed(action: impl Into<String>, error: &RequestError, elapsed: Duration) -> Self {
        Self::new(action, ResultCode::Err)
            .latency(elapsed)
            .detail(error.to_string())
    }

    pub fn served_by(mut self, target: impl Into<String>) -> Self {
        self.served_by = target.into();
        self
    }

    pub fn latency(mut self, elapsed: Duration) -> Self {
        self.latency_ms = Some(latency_ms(elapsed));
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(ResultCode::Status(200).classify(), Class::Ok);
        assert_eq!(ResultCode::Status(399).classify(), Class::Ok);
        assert_eq!(ResultCode::Status(400).classify(), Class::Warn);
        assert_eq!(ResultCode::Status(404).classify(), Class::Warn);
        assert_eq!(ResultCode::Status(499).classify(), Class::Warn);
        assert_eq!(ResultCode::Status(500).classify(), Class::Err);
        assert_eq!(ResultCode::Status(503).classify(), Class::Err);
        assert_eq!(ResultCode::Err.classify(), Class::Err);
        assert_eq!(ResultCode::None.classify(), Class::Ok);
    }

    #[test]
    fn test_entry_serializes_code_shapes() {
        let ok = serde_json::to_value(ActionEntry::new("GET /data", ResultCode::Status(200))).unwrap();
        assert_eq!(ok["code"], 200);
        assert_eq!(ok["class"], "ok");

        let err = serde_json::to_value(ActionEntry::new("POST /fail", ResultCode::Err)).unwrap();
        assert_eq!(err["code"], "ERR");
        assert_eq!(err["class"], "err");

        let none = serde_json::to_value(ActionEntry::new(FAILOVER_ACTION, ResultCode::None)).unwrap();
        assert!(none["code"].is_null());
    }

    #[test]
    fn test_failed_entry_carries_error_text() {
        let err = RequestError::Transport("connection refused".into());
        let entry = ActionEntry::failed("GET /data", &err, Duration::from_millis(4));
        assert_eq!(entry.code, ResultCode::Err);
        assert_eq!(entry.latency_ms, Some(4));
        assert_eq!(entry.detail.as_deref(), Some("transport error: connection refused"));
        assert!(entry.served_by.is_empty());
    }
}
