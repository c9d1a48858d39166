use crate::models::*;
use crate::parsers::{unescape, LineGrammar};
use regex::Regex;

// key="quoted \"value\"" | key=[a, b] | key=bare | bare-key<space>
// Separators are ASCII whitespace only.
const KEY_VALUE_PATTERN: &str = r#"(?x)
    (?P<key>[^\t\n\x0B\x0C\r\x20=]+)
    (?:
        [\t\n\x0B\x0C\r\x20]
        |
        =
        (?P<value>
            "(?P<quoted>[^"\\]*(?:\\.[^"\\]*)*)"
            |
            \[(?P<array>[^\]\\]*(?:\\.[^\]\\]*)*)\]
            |
            [^\t\n\x0B\x0C\r\x20]*
        )
    )
"#;

/// Scanner for containerd-style key=value tokens
#[derive(Debug, Clone)]
pub struct KvParser {
    key_value_regex: Regex,
}

impl KvParser {
    pub fn new() -> Self {
        Self {
            key_value_regex: Regex::new(KEY_VALUE_PATTERN).expect("key-value pattern compiles"),
        }
    }

    /// Decode every `key=value` token, left to right. Bare keys and
    /// unrecognized text are skipped.
    pub fn extract_pairs(&self, text: &str) -> Vec<(String, FieldValue)> {
        let mut pairs = Vec::new();

        for cap in self.key_value_regex.captures_iter(text) {
            let key = match cap.name("key") {
                Some(key) => key.as_str(),
                None => continue,
            };

            let value = if let Some(quoted) = cap.name("quoted") {
                FieldValue::String(unescape(quoted.as_str()))
            } else if let Some(array) = cap.name("array") {
                FieldValue::List(split_list(array.as_str()))
            } else if let Some(bare) = cap.name("value") {
                FieldValue::String(bare.as_str().to_string())
            } else {
                tracing::trace!(key, "skipping bare key");
                continue;
            };

            pairs.push((key.to_string(), value));
        }

        pairs
    }

    /// Merge decoded pairs into `record`, overwriting existing keys.
    /// Returns the number of pairs found.
    pub fn scan_into(&self, text: &str, record: &mut Record) -> usize {
        let pairs = self.extract_pairs(text);
        let count = pairs.len();
        record.extend(pairs);
        count
    }
}

impl Default for KvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineGrammar for KvParser {
    fn can_parse(&self, line: &str) -> bool {
        !self.extract_pairs(line).is_empty()
    }

    fn get_format_type(&self) -> FormatType {
        FormatType::ContainerdKv
    }
}

/// Split list content on commas and trim each element. Trailing empty
/// elements are dropped, so `[]` is an empty list.
fn split_list(inner: &str) -> Vec<String> {
    let mut parts: Vec<&str> = inner.split(',').collect();
    while parts.last().map_or(false, |p| p.is_empty()) {
        parts.pop();
    }
    parts.into_iter().map(|p| p.trim().to_string()).collect()
}
