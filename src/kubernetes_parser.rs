use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::models::*;
use crate::parse_result::ParsedLine;
use crate::parsers::{KlogParser, KvParser, LineGrammar};
use crate::time_parser::TimeParser;
use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Parser for kubernetes component logs: klog headers, containerd key=value
/// lines, and klog headers carrying key=value context.
///
/// The parser holds no per-call state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct KubernetesParser {
    config: ParserConfig,
    default_offset: FixedOffset,
    klog_parser: KlogParser,
    kv_parser: KvParser,
    time_parser: TimeParser,
}

impl KubernetesParser {
    /// Validate `config` and build the parser
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        let default_offset = config.validate()?;
        let time_parser = TimeParser::new(config.time_format.as_deref(), default_offset);

        tracing::debug!(
            default_tz = %default_offset,
            force_year = ?config.force_year,
            time_key = %config.time_key,
            time_format = ?time_parser.format(),
            "kubernetes parser configured"
        );

        Ok(Self {
            config,
            default_offset,
            klog_parser: KlogParser::new(),
            kv_parser: KvParser::new(),
            time_parser,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a line using the system clock for the header year
    pub fn parse(&self, line: &str) -> ParsedLine {
        self.parse_at(line, Utc::now())
    }

    /// Parse a possibly absent line
    pub fn parse_opt(&self, line: Option<&str>) -> ParsedLine {
        match line {
            Some(line) => self.parse(line),
            None => ParsedLine::empty(),
        }
    }

    /// Parse a line; `now` supplies the year when `force_year` is unset.
    /// One trailing `\n` or `\r\n` is ignored.
    pub fn parse_at(&self, line: &str, now: DateTime<Utc>) -> ParsedLine {
        let line = strip_line_terminator(line);
        if line.is_empty() {
            return ParsedLine::empty();
        }

        let mut record = Record::new();
        let mut header_matched = false;

        let kv_text = match self.klog_parser.match_header(line) {
            Some(header) => {
                header_matched = true;
                let year = self
                    .config
                    .force_year
                    .unwrap_or_else(|| now.with_timezone(&self.default_offset).year());
                record = header.to_record(year, &self.default_offset);
                header.tail
            }
            None => Some(line),
        };

        let kv_pairs = kv_text
            .map(|text| self.kv_parser.scan_into(text, &mut record))
            .unwrap_or(0);

        let format_type = match (header_matched, kv_pairs > 0) {
            (true, true) => FormatType::KlogWithContext,
            (true, false) => FormatType::Klog,
            (false, true) => FormatType::ContainerdKv,
            (false, false) => FormatType::Unstructured,
        };
        tracing::trace!(%format_type, fields = record.len(), "line parsed");

        let timestamp = self.resolve_timestamp(&mut record);
        ParsedLine::new(timestamp, record, format_type)
    }

    /// Which grammar would recognize `line`, without building a record
    pub fn detect_format(&self, line: &str) -> FormatType {
        let line = strip_line_terminator(line);
        if line.is_empty() {
            return FormatType::Empty;
        }
        if self.klog_parser.can_parse(line) {
            return self.klog_parser.get_format_type();
        }
        if self.kv_parser.can_parse(line) {
            return self.kv_parser.get_format_type();
        }
        FormatType::Unstructured
    }

    /// Read the time key into a timestamp. The key is dropped from the
    /// record only when parsing succeeded and `keep_time_key` is off.
    fn resolve_timestamp(&self, record: &mut Record) -> Option<DateTime<Utc>> {
        let time_key = &self.config.time_key;
        let value = record.get(time_key)?;

        match self.time_parser.parse(value) {
            Ok(timestamp) => {
                if !self.config.keep_time_key {
                    record.remove(time_key);
                }
                Some(timestamp)
            }
            Err(e) => {
                tracing::debug!(error = %e, "time key unparsable, falling back to caller clock");
                None
            }
        }
    }
}

fn strip_line_terminator(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => line,
    }
}
