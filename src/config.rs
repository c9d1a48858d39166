use crate::error::ParseError;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the kubernetes line parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Single-character delimiter
    pub delimiter: String,

    /// Offset applied to header timestamps and zone-less time values
    pub default_tz: String,

    /// Year used for header timestamps (the header carries none)
    pub force_year: Option<i32>,

    /// Keep the time key in the record after the timestamp was extracted
    pub keep_time_key: bool,

    /// Explicit format for the time key; automatic detection when unset
    pub time_format: Option<String>,

    /// Record key holding the event time
    pub time_key: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: " ".to_string(),
            default_tz: "+00:00".to_string(),
            force_year: None,
            keep_time_key: false,
            time_format: None,
            time_key: "time".to_string(),
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ParseError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ParseError::IoError {
            operation: format!("reading config {}", path.display()),
            error_message: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ParseError::config("config", e.to_string()))
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_default_tz(mut self, default_tz: impl Into<String>) -> Self {
        self.default_tz = default_tz.into();
        self
    }

    pub fn with_force_year(mut self, year: i32) -> Self {
        self.force_year = Some(year);
        self
    }

    pub fn with_keep_time_key(mut self, keep: bool) -> Self {
        self.keep_time_key = keep;
        self
    }

    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = Some(format.into());
        self
    }

    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    /// Check every setting and resolve the default offset
    pub fn validate(&self) -> Result<FixedOffset, ParseError> {
        if self.delimiter.chars().count() != 1 {
            return Err(ParseError::config(
                "delimiter",
                format!("delimiter must be a single character. '{}' is not.", self.delimiter),
            ));
        }

        if self.time_key.is_empty() {
            return Err(ParseError::config("time_key", "time_key must not be empty"));
        }

        parse_offset(&self.default_tz).ok_or_else(|| {
            ParseError::config(
                "default_tz",
                format!("'{}' is not a valid UTC offset (expected +HH:MM)", self.default_tz),
            )
        })
    }
}

/// Parse `+HH:MM`, `+HHMM`, `+HH`, `Z` or `UTC` into a fixed offset
pub fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let sign = match value.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = value[1..].chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
