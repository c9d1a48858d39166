use crate::cli::{OutputFormat, StatsArgs};
use crate::commands::output::print_stats_summary;
use crate::commands::parse::{expand_globs, read_lines};
use crate::{KubernetesParser, ParsingStatistics};
use rayon::prelude::*;

pub fn run_stats(args: StatsArgs, parser: &KubernetesParser) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_globs(&args.files)?;
    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let mut stats = ParsingStatistics::new();
    for file_path in &files {
        let lines = read_lines(file_path)?;
        stats = stats.merge(collect_statistics(parser, &lines));
    }

    match args.output {
        OutputFormat::Json | OutputFormat::Ndjson => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        _ => print_stats_summary(&stats),
    }

    Ok(())
}

/// Parse `lines` in parallel and fold the results into statistics
pub fn collect_statistics(parser: &KubernetesParser, lines: &[String]) -> ParsingStatistics {
    lines
        .par_iter()
        .fold(ParsingStatistics::new, |mut stats, line| {
            stats.record(&parser.parse(line));
            stats
        })
        .reduce(ParsingStatistics::new, ParsingStatistics::merge)
}
