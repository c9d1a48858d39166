use crate::cli::ParseArgs;
use crate::commands::output::OutputFormatter;
use crate::{KubernetesParser, ParsedLine};
use chrono::Utc;
use glob::glob;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{stdin, stdout, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub fn run_parse(args: ParseArgs, parser: &KubernetesParser) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = OutputFormatter::new(args.output, Utc::now());

    let files = expand_globs(&args.files)?;
    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let levels: Option<Vec<String>> = args
        .level
        .as_ref()
        .map(|lvls| lvls.iter().map(|l| l.to_lowercase()).collect());
    let field_filters = parse_field_filters(&args.field);

    let mut output: Box<dyn Write> = if let Some(ref path) = args.output_file {
        Box::new(File::create(path)?)
    } else {
        Box::new(stdout())
    };

    formatter.print_header(&mut output)?;

    let mut output_count = 0;
    'files: for file_path in &files {
        let lines = read_lines(file_path)?;
        tracing::info!(file = %file_path.display(), lines = lines.len(), "parsing");

        for (raw, parsed) in lines.iter().zip(parse_lines(parser, &lines)) {
            if parsed.is_empty() || !matches_filters(&parsed, &levels, &field_filters) {
                continue;
            }

            if let Some(limit) = args.limit {
                if output_count >= limit {
                    break 'files;
                }
            }

            writeln!(output, "{}", formatter.format_line(raw, &parsed))?;
            output_count += 1;
        }
    }

    output.flush()?;
    Ok(())
}

/// Parse lines in parallel; results keep input order
pub fn parse_lines(parser: &KubernetesParser, lines: &[String]) -> Vec<ParsedLine> {
    lines.par_iter().map(|line| parser.parse(line)).collect()
}

/// Read every line of `path`; `-` reads standard input
pub fn read_lines(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(stdin()))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };

    reader
        .lines()
        .map(|line| line.map(|l| l.trim_end_matches('\r').to_string()))
        .collect()
}

pub fn expand_globs(patterns: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let pattern_str = pattern.to_string_lossy();
        if pattern_str.contains('*') || pattern_str.contains('?') {
            for entry in glob(&pattern_str)? {
                files.push(entry?);
            }
        } else {
            files.push(pattern.clone());
        }
    }
    Ok(files)
}

pub fn parse_field_filters(filters: &Option<Vec<String>>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(filters) = filters {
        for filter in filters {
            if let Some((key, value)) = filter.split_once('=') {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

pub fn matches_filters(
    parsed: &ParsedLine,
    levels: &Option<Vec<String>>,
    field_filters: &HashMap<String, String>,
) -> bool {
    if let Some(ref allowed_levels) = levels {
        match parsed.level() {
            Some(level) if allowed_levels.iter().any(|l| l == level) => {}
            _ => return false,
        }
    }

    for (key, expected_value) in field_filters {
        match parsed.get(key) {
            Some(value) if value.to_string().contains(expected_value.as_str()) => {}
            _ => return false,
        }
    }

    true
}
