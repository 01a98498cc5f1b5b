use clap::Parser;
use linkscrub::checker::HttpChecker;
use linkscrub::cli::{Cli, cli_to_config};
use linkscrub::config::{CliConfig, Config};
use linkscrub::logging;
use linkscrub::pipeline;
use linkscrub::progress::ProgressReporter;
use linkscrub::stats::Statistics;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run_linkscrub_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Main cleaning logic extracted from main() for testing
async fn run_linkscrub_logic(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let cli_config = cli_to_config(cli);

    // Load and merge configuration
    let config = load_and_merge_config(&cli_config)?;
    config.validate()?;

    let visual = config.visual();
    logging::init_logger(config.verbose(), visual || config.quiet());

    let input = Path::new(&cli.input_file);
    logging::log_run_info(&config, input);

    let stats = Arc::new(Statistics::new(&config.fields()));
    let checker = Arc::new(HttpChecker::new(&config)?);

    // The visual bar needs a total, which costs one pass over the input
    let mut progress = ProgressReporter::new(visual);
    if visual {
        progress.start_run(count_lines(input)?);
    }

    let run_result = pipeline::run(
        input,
        &config,
        checker,
        Arc::clone(&stats),
        progress.run_bar(),
    )
    .await;

    let snapshot = stats.snapshot();
    match run_result {
        Ok(()) => {
            progress.finish_run(snapshot.records_written, snapshot.total_timed_out());
            logging::log_summary(&snapshot);
            if !config.quiet() {
                println!(
                    "Done. Cleaned dataset written to {}",
                    config.output_path(input).display()
                );
            }
            Ok(0)
        }
        Err(e) => {
            progress.log_error(&e.to_string());
            // Report what completed before the failure
            logging::log_summary(&snapshot);
            Err(Box::new(e))
        }
    }
}

/// Load configuration from file or standard locations and merge with CLI config
fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // CLI arguments take precedence over the config file
    config.merge_with_cli(cli_config);
    Ok(config)
}

fn count_lines(path: &Path) -> std::io::Result<u64> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0u64;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}
