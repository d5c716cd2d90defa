//! Append-only audit log entries.
//!
//! Entries are owned by their session, created only through the
//! session's logging path, and never mutated once written. They are the
//! durable record a human auditor reconstructs a session from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Structured snapshot of the relevant data at this point.
    pub payload: serde_json::Value,
}

impl AuditLogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_serialization() {
        let entry = AuditLogEntry::new(
            LogLevel::Warning,
            "Validation failed",
            json!({"slot": "product"}),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["level"], "warning");
        assert_eq!(value["payload"]["slot"], "product");
    }
}
