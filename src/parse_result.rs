use crate::models::{FieldValue, FormatType, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLine {
    /// Event time, absent when the caller's clock should be used
    pub timestamp: Option<DateTime<Utc>>,
    /// Extracted fields, absent only for empty input
    pub record: Option<Record>,
    /// Which grammar(s) recognized the line
    pub format_type: FormatType,
}

impl ParsedLine {
    /// The `(absent, absent)` result for empty input
    pub fn empty() -> Self {
        Self {
            timestamp: None,
            record: None,
            format_type: FormatType::Empty,
        }
    }

    pub fn new(timestamp: Option<DateTime<Utc>>, record: Record, format_type: FormatType) -> Self {
        Self {
            timestamp,
            record: Some(record),
            format_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_none()
    }

    /// The event time, or `fallback` when none could be resolved
    pub fn timestamp_or(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        self.timestamp.unwrap_or(fallback)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.record.as_ref().and_then(|record| record.get(key))
    }

    /// Level field as text, if present
    pub fn level(&self) -> Option<&str> {
        self.get("level").and_then(FieldValue::as_str)
    }

    pub fn into_parts(self) -> (Option<DateTime<Utc>>, Option<Record>) {
        (self.timestamp, self.record)
    }
}
