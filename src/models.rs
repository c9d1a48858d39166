use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Structured fields extracted from one log line, keyed by field name
pub type Record = BTreeMap<String, FieldValue>;

/// A single decoded field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    String(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::List(items) => write!(f, "[{}]", items.join(",")),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// klog severity, encoded as the first letter of the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KlogSeverity {
    Info,
    Warn,
    Error,
    Fatal,
}

impl KlogSeverity {
    pub fn from_letter(letter: &str) -> Option<KlogSeverity> {
        match letter {
            "I" => Some(KlogSeverity::Info),
            "W" => Some(KlogSeverity::Warn),
            "E" => Some(KlogSeverity::Error),
            "F" => Some(KlogSeverity::Fatal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KlogSeverity::Info => "info",
            KlogSeverity::Warn => "warn",
            KlogSeverity::Error => "error",
            KlogSeverity::Fatal => "fatal",
        }
    }

    /// Level name for a header letter; unknown letters pass through unchanged
    pub fn level_name(letter: &str) -> String {
        KlogSeverity::from_letter(letter)
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| letter.to_string())
    }
}

/// Which grammar(s) recognized a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormatType {
    /// klog header with no key-value tail
    Klog,
    /// klog header followed by key-value context
    KlogWithContext,
    /// containerd-style key=value line
    ContainerdKv,
    /// Nothing recognized
    Unstructured,
    /// Empty input
    Empty,
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatType::Klog => "klog",
            FormatType::KlogWithContext => "klog+kv",
            FormatType::ContainerdKv => "kv",
            FormatType::Unstructured => "unstructured",
            FormatType::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}
