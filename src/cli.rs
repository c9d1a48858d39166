use crate::config::ParserConfig;
use crate::error::ParseError;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kubeparse")]
#[command(author, version, about = "Parse klog and containerd log lines into structured records")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub parser: ParserArgs,

    /// Number of parallel threads (0 = auto-detect)
    #[arg(long, short = 'j', global = true, default_value = "0")]
    pub parallel: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse log files and output structured records
    Parse(ParseArgs),

    /// Show the last lines of a file, parsed, optionally following it
    Tail(TailArgs),

    /// Show format, level and timestamp statistics
    Stats(StatsArgs),
}

/// Parser settings shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ParserArgs {
    /// JSON file with parser settings; flags below override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Single-character delimiter
    #[arg(long, global = true)]
    pub delimiter: Option<String>,

    /// UTC offset for klog header timestamps (e.g. +02:00)
    #[arg(long, global = true)]
    pub default_tz: Option<String>,

    /// Year for klog header timestamps (defaults to the current year)
    #[arg(long, global = true)]
    pub force_year: Option<i32>,

    /// Keep the time key in records after extracting the timestamp
    #[arg(long, global = true)]
    pub keep_time_key: bool,

    /// Format of the time key value (strftime, %N and %L accepted)
    #[arg(long, global = true)]
    pub time_format: Option<String>,

    /// Record key holding the event time
    #[arg(long, global = true)]
    pub time_key: Option<String>,
}

impl ParserArgs {
    /// Resolve the effective configuration: file first, then flags
    pub fn to_config(&self) -> Result<ParserConfig, ParseError> {
        let mut config = match &self.config {
            Some(path) => ParserConfig::from_json_file(path)?,
            None => ParserConfig::default(),
        };

        if let Some(delimiter) = &self.delimiter {
            config.delimiter = delimiter.clone();
        }
        if let Some(default_tz) = &self.default_tz {
            config.default_tz = default_tz.clone();
        }
        if let Some(year) = self.force_year {
            config.force_year = Some(year);
        }
        if self.keep_time_key {
            config.keep_time_key = true;
        }
        if let Some(format) = &self.time_format {
            config.time_format = Some(format.clone());
        }
        if let Some(key) = &self.time_key {
            config.time_key = key.clone();
        }

        Ok(config)
    }
}

#[derive(Args)]
pub struct ParseArgs {
    /// Log files to parse (supports glob patterns, `-` for stdin)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Filter by level value(s)
    #[arg(long, short)]
    pub level: Option<Vec<String>>,

    /// Filter by field value (format: field=value)
    #[arg(long, short = 'F')]
    pub field: Option<Vec<String>>,

    /// Maximum number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output file (default: stdout)
    #[arg(long)]
    pub output_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct TailArgs {
    /// Log file to tail
    #[arg(required = true)]
    pub file: PathBuf,

    /// Follow file changes (like tail -f)
    #[arg(long, short)]
    pub follow: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Filter by level value(s)
    #[arg(long, short)]
    pub level: Option<Vec<String>>,

    /// Number of lines to show initially
    #[arg(long, short = 'n', default_value = "10")]
    pub lines: usize,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Log files to analyze
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format (table or json)
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON per record
    Json,
    /// Newline-delimited JSON
    Ndjson,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Ndjson => write!(f, "ndjson"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
