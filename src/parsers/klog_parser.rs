use crate::models::*;
use crate::parsers::{unescape, LineGrammar};
use chrono::FixedOffset;
use regex::Regex;

// Lmmdd hh:mm:ss.uuuuuu threadid file:line] msg...
//
//   L                severity letter (I, W, E, F)
//   mmdd             zero padded month and day
//   hh:mm:ss.uuuuuu  time of day with optional fraction
//   threadid         space padded thread id
//   file:line        source location
//   msg              quoted message followed by key="value" context, or free text
//
// Whitespace is ASCII only; a no-break space is part of the token it touches.
const KLOG_HEADER_PATTERN: &str = r#"(?x)
    ^
    (?P<log_level>[A-Z])(?P<month>[0-9]{2})(?P<day>[0-9]{2})[\t\n\x0B\x0C\r\x20]+
    (?P<time>[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?)[\t\n\x0B\x0C\r\x20]+
    (?P<threadid>[0-9]+)[\t\n\x0B\x0C\r\x20]+
    (?P<file>[^\x20]*):(?P<line>[0-9]+)\][\t\n\x0B\x0C\r\x20]
    (?:
        "(?P<msg>[^"\\]*(?:\\.[^"\\]*)*)"(?:[\t\n\x0B\x0C\r\x20]+(?P<kv>.*))?
        |
        (?P<greedy_msg>.*)
    )
    $
"#;

/// Raw captures of a matched klog header
#[derive(Debug, Clone, PartialEq)]
pub struct KlogHeader<'a> {
    pub log_level: &'a str,
    pub month: &'a str,
    pub day: &'a str,
    pub time: &'a str,
    pub thread_id: &'a str,
    pub file: &'a str,
    pub line: &'a str,
    /// Message with escapes resolved when it was quoted
    pub message: String,
    /// Key-value context after a quoted message
    pub tail: Option<&'a str>,
}

impl<'a> KlogHeader<'a> {
    /// ISO-8601 timestamp string for the header, e.g. `2022-05-24T16:21:12.823864+02:00`
    pub fn timestamp_string(&self, year: i32, offset: &FixedOffset) -> String {
        format!("{}-{}-{}T{}{}", year, self.month, self.day, self.time, offset)
    }

    /// Map the header onto record fields. Month, day and time only survive
    /// through the combined `time` field.
    pub fn to_record(&self, year: i32, offset: &FixedOffset) -> Record {
        let mut record = Record::new();
        record.insert("time".to_string(), FieldValue::String(self.timestamp_string(year, offset)));
        record.insert("level".to_string(), FieldValue::String(KlogSeverity::level_name(self.log_level)));
        record.insert("threadid".to_string(), integer_field("threadid", self.thread_id));
        record.insert("file".to_string(), FieldValue::String(self.file.to_string()));
        record.insert("line".to_string(), integer_field("line", self.line));
        record.insert("msg".to_string(), FieldValue::String(self.message.clone()));
        record
    }
}

fn integer_field(name: &str, digits: &str) -> FieldValue {
    match digits.parse::<i64>() {
        Ok(n) => FieldValue::Integer(n),
        Err(e) => {
            tracing::warn!(field = name, value = digits, error = %e, "integer field out of range, keeping text");
            FieldValue::String(digits.to_string())
        }
    }
}

/// Recognizer for the klog header
#[derive(Debug, Clone)]
pub struct KlogParser {
    header_regex: Regex,
}

impl KlogParser {
    pub fn new() -> Self {
        Self {
            header_regex: Regex::new(KLOG_HEADER_PATTERN).expect("klog header pattern compiles"),
        }
    }

    /// Match the whole header or nothing
    pub fn match_header<'a>(&self, line: &'a str) -> Option<KlogHeader<'a>> {
        let caps = self.header_regex.captures(line)?;
        let text = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

        let (message, tail) = match caps.name("greedy_msg") {
            Some(greedy) => (greedy.as_str().to_string(), None),
            None => (unescape(text("msg")), caps.name("kv").map(|m| m.as_str())),
        };

        Some(KlogHeader {
            log_level: text("log_level"),
            month: text("month"),
            day: text("day"),
            time: text("time"),
            thread_id: text("threadid"),
            file: text("file"),
            line: text("line"),
            message,
            tail,
        })
    }
}

impl Default for KlogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineGrammar for KlogParser {
    fn can_parse(&self, line: &str) -> bool {
        self.header_regex.is_match(line)
    }

    fn get_format_type(&self) -> FormatType {
        FormatType::Klog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn test_unquoted_message_has_no_tail() {
        let parser = KlogParser::new();
        let header = parser
            .match_header("I0524 16:21:12.823864    1025 log.go:195] http: superfluous response key=value")
            .unwrap();

        assert_eq!(header.log_level, "I");
        assert_eq!(header.month, "05");
        assert_eq!(header.day, "24");
        assert_eq!(header.time, "16:21:12.823864");
        assert_eq!(header.thread_id, "1025");
        assert_eq!(header.file, "log.go");
        assert_eq!(header.line, "195");
        assert_eq!(header.message, "http: superfluous response key=value");
        assert_eq!(header.tail, None);
    }

    #[test]
    fn test_quoted_message_with_tail() {
        let parser = KlogParser::new();
        let header = parser
            .match_header(r#"I0527 09:00:05.110852    1025 eviction_manager.go:167] "Failed to admit pod to node" pod="monitoring/prometheus-k8s-0" nodeCondition=[DiskPressure]"#)
            .unwrap();

        assert_eq!(header.message, "Failed to admit pod to node");
        assert_eq!(
            header.tail,
            Some(r#"pod="monitoring/prometheus-k8s-0" nodeCondition=[DiskPressure]"#)
        );
    }

    #[test]
    fn test_quoted_message_escapes_resolved() {
        let parser = KlogParser::new();
        let header = parser
            .match_header(r#"E0101 00:00:00 7 a.go:1] "say \"hi\"""#)
            .unwrap();
        assert_eq!(header.message, r#"say "hi""#);
        assert_eq!(header.time, "00:00:00");
        assert_eq!(header.tail, None);
    }

    #[test]
    fn test_text_glued_to_quote_falls_back_to_raw_message() {
        let parser = KlogParser::new();
        let header = parser
            .match_header(r#"W0627 12:09:57.042726  462622 empty_dir.go:519] "quoted"suffix"#)
            .unwrap();
        assert_eq!(header.message, r#""quoted"suffix"#);
        assert_eq!(header.tail, None);
    }

    #[test]
    fn test_non_header_lines_do_not_match() {
        let parser = KlogParser::new();
        for line in [
            r#"time="2022-05-24T14:08:25.144534370+02:00" level=info msg="x""#,
            "i0524 16:21:12.823864 1025 log.go:195] lower case level",
            "I0524 16:21:12.823864 1025 log.go] missing line number",
            "I524 16:21:12 1025 log.go:195] short date",
            "I0524 16:21:12 1025 log.go:195]",
        ] {
            assert!(parser.match_header(line).is_none(), "unexpected match: {}", line);
            assert!(!parser.can_parse(line));
        }
    }

    #[test]
    fn test_only_ascii_whitespace_separates_header_fields() {
        let parser = KlogParser::new();
        assert!(parser.match_header("I0524\u{a0}16:21:12 1025 log.go:195] nbsp").is_none());

        let header = parser
            .match_header("I0524\t16:21:12 1025 log.go:195] \"m\"\tk=v  \u{a0}z=1")
            .unwrap();
        assert_eq!(header.message, "m");
        assert_eq!(header.tail, Some("k=v  \u{a0}z=1"));
    }

    #[test]
    fn test_to_record_mapping() {
        let parser = KlogParser::new();
        let header = parser
            .match_header("W0627 12:09:57.042726  462622 empty_dir.go:519] Warning: quota")
            .unwrap();
        let record = header.to_record(2022, &plus_two());

        assert_eq!(record.len(), 6);
        assert_eq!(record["time"], FieldValue::from("2022-06-27T12:09:57.042726+02:00"));
        assert_eq!(record["level"], FieldValue::from("warn"));
        assert_eq!(record["threadid"], FieldValue::Integer(462622));
        assert_eq!(record["line"], FieldValue::Integer(519));
        assert_eq!(record["file"], FieldValue::from("empty_dir.go"));
        assert_eq!(record["msg"], FieldValue::from("Warning: quota"));
    }

    #[test]
    fn test_unknown_level_letter_passes_through() {
        let parser = KlogParser::new();
        let header = parser.match_header("D0101 00:00:00 1 x.go:2] debug").unwrap();
        let record = header.to_record(2022, &plus_two());
        assert_eq!(record["level"], FieldValue::from("D"));
    }

    #[test]
    fn test_oversized_integer_kept_as_text() {
        let parser = KlogParser::new();
        let header = parser
            .match_header("I0101 00:00:00 99999999999999999999 x.go:2] big")
            .unwrap();
        let record = header.to_record(2022, &plus_two());
        assert_eq!(record["threadid"], FieldValue::from("99999999999999999999"));
        assert_eq!(record["line"], FieldValue::Integer(2));
    }
}
