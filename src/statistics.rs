use crate::models::FormatType;
use crate::parse_result::ParsedLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsing statistics for monitoring and debugging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingStatistics {
    /// Total number of lines processed, empty ones included
    pub total_lines: usize,
    /// Lines that were empty
    pub empty_lines: usize,
    /// Lines whose time key resolved to a timestamp
    pub with_timestamp: usize,
    /// Non-empty lines that fell back to the caller clock
    pub timestamp_fallbacks: usize,
    /// Format distribution
    pub format_distribution: BTreeMap<FormatType, usize>,
    /// Level distribution, keyed by the record's `level` value
    pub level_distribution: BTreeMap<String, usize>,
}

impl ParsingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one parsed line
    pub fn record(&mut self, parsed: &ParsedLine) {
        self.total_lines += 1;
        *self.format_distribution.entry(parsed.format_type).or_insert(0) += 1;

        if parsed.is_empty() {
            self.empty_lines += 1;
            return;
        }

        if parsed.timestamp.is_some() {
            self.with_timestamp += 1;
        } else {
            self.timestamp_fallbacks += 1;
        }

        if let Some(level) = parsed.level() {
            *self.level_distribution.entry(level.to_string()).or_insert(0) += 1;
        }
    }

    /// Fold another set of statistics into this one
    pub fn merge(mut self, other: ParsingStatistics) -> ParsingStatistics {
        self.total_lines += other.total_lines;
        self.empty_lines += other.empty_lines;
        self.with_timestamp += other.with_timestamp;
        self.timestamp_fallbacks += other.timestamp_fallbacks;
        for (format, count) in other.format_distribution {
            *self.format_distribution.entry(format).or_insert(0) += count;
        }
        for (level, count) in other.level_distribution {
            *self.level_distribution.entry(level).or_insert(0) += count;
        }
        self
    }

    /// Share of non-empty lines recognized by at least one grammar, in percent
    pub fn structured_rate(&self) -> f64 {
        let non_empty = self.total_lines - self.empty_lines;
        if non_empty == 0 {
            return 0.0;
        }
        let unstructured = self
            .format_distribution
            .get(&FormatType::Unstructured)
            .copied()
            .unwrap_or(0);
        ((non_empty - unstructured) as f64 / non_empty as f64) * 100.0
    }

    /// Share of non-empty lines that needed the fallback clock, in percent
    pub fn fallback_rate(&self) -> f64 {
        let non_empty = self.total_lines - self.empty_lines;
        if non_empty == 0 {
            0.0
        } else {
            (self.timestamp_fallbacks as f64 / non_empty as f64) * 100.0
        }
    }
}
