use clap::Parser;
use kubeparse::cli::{Cli, Commands};
use kubeparse::commands::{run_parse, run_stats, run_tail};
use kubeparse::KubernetesParser;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.parallel > 0 {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(cli.parallel).build_global() {
            tracing::warn!(error = %e, "could not size the thread pool");
        }
    }

    let parser = KubernetesParser::new(cli.parser.to_config()?)?;

    match cli.command {
        Commands::Parse(args) => run_parse(args, &parser),
        Commands::Stats(args) => run_stats(args, &parser),
        Commands::Tail(args) => run_tail(args, &parser),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
