use crate::cli::OutputFormat;
use crate::{FieldValue, ParsedLine, ParsingStatistics};
use chrono::{DateTime, Utc};
use colored::*;
use serde_json::json;
use std::io::{self, Write};

const CSV_COLUMNS: [&str; 6] = ["timestamp", "format", "level", "msg", "fields", "raw"];

pub struct OutputFormatter {
    format: OutputFormat,
    fallback_time: DateTime<Utc>,
}

impl OutputFormatter {
    /// `fallback_time` stands in for lines whose time key did not resolve
    pub fn new(format: OutputFormat, fallback_time: DateTime<Utc>) -> Self {
        Self {
            format,
            fallback_time,
        }
    }

    pub fn print_header(&self, writer: &mut impl Write) -> io::Result<()> {
        match self.format {
            OutputFormat::Csv => writeln!(writer, "{}", csv_row(&CSV_COLUMNS)),
            OutputFormat::Table => writeln!(writer, "{}", "─".repeat(100).dimmed()),
            _ => Ok(()),
        }
    }

    pub fn format_line(&self, raw: &str, parsed: &ParsedLine) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(parsed),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&self.line_to_json(raw, parsed)).unwrap_or_default()
            }
            OutputFormat::Ndjson => {
                serde_json::to_string(&self.line_to_json(raw, parsed)).unwrap_or_default()
            }
            OutputFormat::Csv => self.format_csv(raw, parsed),
        }
    }

    fn format_table(&self, parsed: &ParsedLine) -> String {
        let mut output = String::new();

        let ts = match parsed.timestamp {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string().cyan(),
            None => self.fallback_time.format("%Y-%m-%d %H:%M:%S%.6f").to_string().dimmed(),
        };
        output.push_str(&format!("{} ", ts));

        let level = parsed.level().unwrap_or("-").to_string();
        let colored_level = match level.as_str() {
            "fatal" => level.red().bold(),
            "error" => level.red(),
            "warn" | "warning" => level.yellow(),
            "info" => level.green(),
            "debug" => level.blue(),
            _ => level.dimmed(),
        };
        output.push_str(&format!("[{:^5}] ", colored_level));

        if let Some(msg) = parsed.get("msg") {
            output.push_str(&msg.to_string());
        }

        if let Some(record) = &parsed.record {
            let fields_str: Vec<String> = record
                .iter()
                .filter(|(k, _)| k.as_str() != "msg" && k.as_str() != "level")
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            if !fields_str.is_empty() {
                output.push_str(&format!(" {}", fields_str.join(" ").dimmed()));
            }
        }

        output
    }

    fn line_to_json(&self, raw: &str, parsed: &ParsedLine) -> serde_json::Value {
        json!({
            "timestamp": parsed.timestamp_or(self.fallback_time).to_rfc3339(),
            "timestamp_fallback": parsed.timestamp.is_none(),
            "format": parsed.format_type.to_string(),
            "record": parsed.record,
            "raw": raw,
        })
    }

    fn format_csv(&self, raw: &str, parsed: &ParsedLine) -> String {
        let timestamp = parsed.timestamp_or(self.fallback_time).to_rfc3339();
        let format = parsed.format_type.to_string();
        let level = parsed.level().unwrap_or_default().to_string();
        let msg = parsed.get("msg").map(FieldValue::to_string).unwrap_or_default();
        let fields = parsed
            .record
            .as_ref()
            .map(|record| serde_json::to_string(record).unwrap_or_default())
            .unwrap_or_default();

        csv_row(&[
            timestamp.as_str(),
            format.as_str(),
            level.as_str(),
            msg.as_str(),
            fields.as_str(),
            raw,
        ])
    }
}

/// Encode one CSV row without the trailing newline
fn csv_row(columns: &[&str]) -> String {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    if writer.write_record(columns).is_err() {
        return String::new();
    }
    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8_lossy(&bytes).trim_end_matches('\n').to_string()
}

pub fn print_stats_summary(stats: &ParsingStatistics) {
    println!("\n{}", "═".repeat(50).cyan());
    println!("{}", "SUMMARY".cyan().bold());
    println!("{}", "═".repeat(50).cyan());
    println!("Total lines:         {}", stats.total_lines.to_string().white().bold());
    println!("Empty lines:         {}", stats.empty_lines);
    println!(
        "Structured:          {:.1}%",
        stats.structured_rate()
    );
    println!(
        "With timestamp:      {}",
        stats.with_timestamp.to_string().cyan()
    );
    println!(
        "Timestamp fallbacks: {} ({:.1}%)",
        stats.timestamp_fallbacks.to_string().yellow(),
        stats.fallback_rate()
    );

    if !stats.format_distribution.is_empty() {
        println!("\n{}:", "Format Distribution".dimmed());
        for (format, count) in &stats.format_distribution {
            println!("  {}: {}", format.to_string().white(), count);
        }
    }

    if !stats.level_distribution.is_empty() {
        println!("\n{}:", "Level Distribution".dimmed());
        for (level, count) in &stats.level_distribution {
            println!("  {}: {}", level.white(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KubernetesParser, ParserConfig};
    use chrono::TimeZone;

    fn fallback() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_ndjson_output() {
        let parser = KubernetesParser::new(ParserConfig::default()).unwrap();
        let raw = r#"time="2022-05-24T14:08:25Z" level=info msg="hello, world""#;
        let formatter = OutputFormatter::new(OutputFormat::Ndjson, fallback());

        let line = formatter.format_line(raw, &parser.parse(raw));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["timestamp"], "2022-05-24T14:08:25+00:00");
        assert_eq!(value["timestamp_fallback"], false);
        assert_eq!(value["format"], "kv");
        assert_eq!(value["record"]["msg"], "hello, world");
        assert_eq!(value["raw"], raw);
    }

    #[test]
    fn test_csv_output_quotes_commas() {
        let parser = KubernetesParser::new(ParserConfig::default()).unwrap();
        let raw = r#"level=warn msg="a, b""#;
        let formatter = OutputFormatter::new(OutputFormat::Csv, fallback());

        let row = formatter.format_line(raw, &parser.parse(raw));
        assert!(row.starts_with("2024-01-01T00:00:00+00:00,kv,warn,\"a, b\","));
    }

    #[test]
    fn test_csv_header() {
        let formatter = OutputFormatter::new(OutputFormat::Csv, fallback());
        let mut out = Vec::new();
        formatter.print_header(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "timestamp,format,level,msg,fields,raw\n");
    }
}
