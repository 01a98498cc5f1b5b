// Command-line interface definitions and parsing for linkscrub

use crate::config::CliConfig;
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Validate and clean URLs in JSON Lines datasets", long_about = None)]
pub struct Cli {
    /// Input JSON Lines file (one JSON object per line)
    pub input_file: String,

    /// Record fields holding URLs to check
    #[arg(required = true)]
    pub fields: Vec<String>,

    // Core Options
    /// Records per chunk (default: 1000)
    #[arg(long, value_name = "COUNT", help_heading = "Core Options")]
    pub chunk_size: Option<usize>,

    /// Parallel workers (default: 1)
    #[arg(long, value_name = "COUNT", help_heading = "Core Options")]
    pub threads: Option<usize>,

    /// Per-request timeout in seconds (default: 10.0)
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help_heading = "Core Options"
    )]
    pub timeout: Option<f64>,

    // Retry & Backoff
    /// Attempts for transient failures (default: 3)
    #[arg(long, value_name = "COUNT", help_heading = "Retry & Backoff")]
    pub retry: Option<u8>,

    /// Backoff base delay in ms, doubled per attempt (default: 1000)
    #[arg(long, value_name = "MS", help_heading = "Retry & Backoff")]
    pub retry_delay: Option<u64>,

    /// In-flight URL checks per worker (default: 20)
    #[arg(long, value_name = "COUNT", help_heading = "Retry & Backoff")]
    pub concurrency: Option<usize>,

    /// Global in-flight request cap (default: threads * concurrency)
    #[arg(long, value_name = "COUNT", help_heading = "Retry & Backoff")]
    pub max_connections: Option<usize>,

    // Cleaning Policy
    /// Delete timed-out URLs instead of keeping them
    #[arg(long, help_heading = "Cleaning Policy")]
    pub delete_timeouts: bool,

    /// Rewrite redirected URLs (301/302/307/308) to their target
    #[arg(long, help_heading = "Cleaning Policy")]
    pub follow_redirects: bool,

    // Output
    /// Output file suffix (default: "_cleaned")
    #[arg(long, value_name = "SUFFIX", help_heading = "Output")]
    pub suffix: Option<String>,

    /// Explicit output path (overrides --suffix)
    #[arg(short = 'o', long, value_name = "FILE", help_heading = "Output")]
    pub output: Option<String>,

    /// Write timed-out URLs to this file, one per line
    #[arg(long, value_name = "FILE", help_heading = "Output")]
    pub timeout_file: Option<String>,

    /// Write "source;target" redirect pairs to this file
    #[arg(long, value_name = "FILE", help_heading = "Output")]
    pub redirects_file: Option<String>,

    // Verbosity
    /// Enable verbose logging
    #[arg(
        short = 'v',
        long,
        conflicts_with = "visual",
        help_heading = "Verbosity"
    )]
    pub verbose: bool,

    /// Suppress the final summary
    #[arg(short = 'q', long, help_heading = "Verbosity")]
    pub quiet: bool,

    /// Show progress bars instead of log lines
    #[arg(long, help_heading = "Verbosity")]
    pub visual: bool,

    // Network
    /// Custom User-Agent header
    #[arg(long, value_name = "AGENT", help_heading = "Network")]
    pub user_agent: Option<String>,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

/// Convert parsed CLI arguments into the CliConfig structure the config
/// merge understands
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    CliConfig {
        fields: Some(cli.fields.clone()),
        chunk_size: cli.chunk_size,
        threads: cli.threads,
        timeout: cli.timeout,
        retry_attempts: cli.retry,
        retry_delay: cli.retry_delay,
        concurrency: cli.concurrency,
        max_connections: cli.max_connections,
        delete_timeouts: cli.delete_timeouts,
        follow_redirects: cli.follow_redirects,
        suffix: cli.suffix.clone(),
        output: cli.output.clone(),
        timeout_file: cli.timeout_file.clone(),
        redirects_file: cli.redirects_file.clone(),
        user_agent: cli.user_agent.clone(),
        verbose: cli.verbose,
        quiet: cli.quiet,
        visual: cli.visual,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
    }
}
