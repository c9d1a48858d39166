use crate::error::ParseError;
use crate::models::FieldValue;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Layouts tried, in order, when no explicit time format is configured.
/// Each entry is (layout, carries_zone).
const AUTO_FORMATS: &[(&str, bool)] = &[
    ("%Y-%m-%dT%H:%M:%S%.f%z", true),
    ("%Y-%m-%d %H:%M:%S%.f%:z", true),
    ("%Y-%m-%d %H:%M:%S%.f %z", true),
    ("%d/%b/%Y:%H:%M:%S %z", true),
    ("%Y-%m-%dT%H:%M:%S%.f", false),
    ("%Y-%m-%d %H:%M:%S%.f", false),
];

/// Turns the value of the time key into an instant
#[derive(Debug, Clone)]
pub struct TimeParser {
    format: Option<String>,
    default_offset: FixedOffset,
}

impl TimeParser {
    pub fn new(format: Option<&str>, default_offset: FixedOffset) -> Self {
        Self {
            format: format.map(translate_format),
            default_offset,
        }
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Parse a record value. Integers are epoch seconds; lists never parse.
    pub fn parse(&self, value: &FieldValue) -> Result<DateTime<Utc>, ParseError> {
        match value {
            FieldValue::String(s) => self.parse_str(s),
            FieldValue::Integer(secs) => Utc.timestamp_opt(*secs, 0).single().ok_or_else(|| {
                ParseError::TimestampParseError {
                    input: secs.to_string(),
                    attempted_formats: vec!["epoch seconds".to_string()],
                }
            }),
            FieldValue::List(_) => Err(ParseError::TimestampParseError {
                input: value.to_string(),
                attempted_formats: Vec::new(),
            }),
        }
    }

    pub fn parse_str(&self, input: &str) -> Result<DateTime<Utc>, ParseError> {
        let input = input.trim();
        match &self.format {
            Some(format) => self.parse_with_format(input, format),
            None => self.parse_auto(input),
        }
    }

    fn parse_with_format(&self, input: &str, format: &str) -> Result<DateTime<Utc>, ParseError> {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Some(dt) = self.parse_naive(input, format) {
            return Ok(dt);
        }

        Err(ParseError::TimestampParseError {
            input: input.to_string(),
            attempted_formats: vec![format.to_string()],
        })
    }

    fn parse_auto(&self, input: &str) -> Result<DateTime<Utc>, ParseError> {
        let mut attempted_formats = vec!["RFC3339".to_string()];
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        for (format, zoned) in AUTO_FORMATS {
            attempted_formats.push(format.to_string());
            let parsed = if *zoned {
                DateTime::parse_from_str(input, format)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            } else {
                self.parse_naive(input, format)
            };
            if let Some(dt) = parsed {
                return Ok(dt);
            }
        }

        attempted_formats.push("epoch seconds".to_string());
        if let Some(dt) = parse_epoch(input) {
            return Ok(dt);
        }

        Err(ParseError::TimestampParseError {
            input: input.to_string(),
            attempted_formats,
        })
    }

    fn parse_naive(&self, input: &str, format: &str) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(input, format).ok()?;
        self.default_offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn parse_epoch(input: &str) -> Option<DateTime<Utc>> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let (secs, frac) = match input.split_once('.') {
        Some((secs, frac)) => (secs, frac),
        None => (input, ""),
    };
    let secs: i64 = secs.parse().ok()?;
    let nanos = if frac.is_empty() {
        0
    } else {
        let digits: String = frac.chars().chain(std::iter::repeat('0')).take(9).collect();
        digits.parse::<u32>().ok()?
    };
    Utc.timestamp_opt(secs, nanos).single()
}

/// Map the `%N`/`%L` fractional directives used by log collector
/// configurations onto their chrono equivalents.
pub fn translate_format(format: &str) -> String {
    format
        .replace(".%N", "%.f")
        .replace(".%L", "%.f")
        .replace("%N", "%9f")
        .replace("%L", "%3f")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_parser() -> TimeParser {
        TimeParser::new(None, FixedOffset::east_opt(0).unwrap())
    }

    fn expected(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_auto_parses_rfc3339_nanoseconds() {
        let parsed = utc_parser().parse_str("2022-05-24T14:08:25.144534370+02:00").unwrap();
        assert_eq!(parsed, expected("2022-05-24T12:08:25.144534370Z"));
    }

    #[test]
    fn test_auto_applies_default_offset_to_naive_values() {
        let parser = TimeParser::new(None, FixedOffset::east_opt(2 * 3600).unwrap());
        let parsed = parser.parse_str("2022-05-24 16:21:12").unwrap();
        assert_eq!(parsed, expected("2022-05-24T14:21:12Z"));
    }

    #[test]
    fn test_auto_parses_epoch_seconds() {
        let parsed = utc_parser().parse_str("1653401292.5").unwrap();
        assert_eq!(parsed.timestamp(), 1653401292);
        assert_eq!(parsed.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_explicit_format_with_nanosecond_directive() {
        let parser = TimeParser::new(
            Some("%Y-%m-%dT%H:%M:%S.%N%:z"),
            FixedOffset::east_opt(0).unwrap(),
        );
        assert_eq!(parser.format(), Some("%Y-%m-%dT%H:%M:%S%.f%:z"));

        let parsed = parser.parse_str("2022-05-24T16:21:12.823864+02:00").unwrap();
        assert_eq!(parsed, expected("2022-05-24T16:21:12.823864+02:00"));
    }

    #[test]
    fn test_explicit_format_without_zone_uses_default_offset() {
        let parser = TimeParser::new(Some("%d/%m/%Y %H:%M"), FixedOffset::west_opt(3600).unwrap());
        let parsed = parser.parse_str("24/05/2022 10:00").unwrap();
        assert_eq!(parsed, expected("2022-05-24T11:00:00Z"));
    }

    #[test]
    fn test_unparsable_value_reports_attempts() {
        match utc_parser().parse_str("not-a-time") {
            Err(ParseError::TimestampParseError { input, attempted_formats }) => {
                assert_eq!(input, "not-a-time");
                assert_eq!(attempted_formats[0], "RFC3339");
                assert!(attempted_formats.len() > 2);
            }
            other => panic!("expected timestamp error, got {:?}", other),
        }
    }

    #[test]
    fn test_field_value_variants() {
        let parser = utc_parser();
        assert_eq!(parser.parse(&FieldValue::Integer(0)).unwrap().timestamp(), 0);
        assert!(parser.parse(&FieldValue::List(vec!["2022".to_string()])).is_err());
    }
}
