//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments. Precedence is defaults, then the
//! config file, then CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;

use crate::core::constants::{defaults, limits};
use crate::core::error::{LinkScrubError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Record fields that hold URLs to check
    pub fields: Option<Vec<String>>,

    /// Records per chunk
    pub chunk_size: Option<usize>,

    /// Number of parallel workers
    pub threads: Option<usize>,

    /// Timeout in seconds for HTTP requests
    pub timeout: Option<f64>,

    /// Attempts for transient failures, initial request included
    pub retry_attempts: Option<u8>,

    /// Backoff base delay between retries in milliseconds
    pub retry_delay: Option<u64>,

    /// In-flight URL checks per worker
    pub concurrency: Option<usize>,

    /// Global cap on in-flight requests across all workers
    pub max_connections: Option<usize>,

    /// Delete timed-out URLs instead of keeping them
    pub delete_timeouts: Option<bool>,

    /// Rewrite redirected URLs to their final target
    pub follow_redirects: Option<bool>,

    /// Suffix appended to the input file stem for the output file
    pub suffix: Option<String>,

    /// Explicit output path, overrides the suffix
    pub output: Option<String>,

    /// Where to write timed-out URLs, one per line
    pub timeout_file: Option<String>,

    /// Where to write `source;target` redirect pairs
    pub redirects_file: Option<String>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Suppress the final summary
    pub quiet: Option<bool>,

    /// Progress bars instead of log lines
    pub visual: Option<bool>,
}

impl Config {
    /// Load configuration from file, validating the result
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LinkScrubError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            LinkScrubError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        // Check for .linkscrub.toml in current directory
        if let Ok(config) = Self::load_from_file(".linkscrub.toml") {
            return config;
        }

        // Check for .linkscrub.toml in parent directories (up to 3 levels)
        for i in 1..=3 {
            let path = format!("{}.linkscrub.toml", "../".repeat(i));
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        if let Some(ref fields) = cli_config.fields {
            self.fields = Some(fields.clone());
        }

        // Core options
        if let Some(chunk_size) = cli_config.chunk_size {
            self.chunk_size = Some(chunk_size);
        }
        if let Some(threads) = cli_config.threads {
            self.threads = Some(threads);
        }
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }

        // Retry & backoff
        if let Some(retry_attempts) = cli_config.retry_attempts {
            self.retry_attempts = Some(retry_attempts);
        }
        if let Some(retry_delay) = cli_config.retry_delay {
            self.retry_delay = Some(retry_delay);
        }
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }
        if let Some(max_connections) = cli_config.max_connections {
            self.max_connections = Some(max_connections);
        }

        // Cleaning policy
        if cli_config.delete_timeouts {
            self.delete_timeouts = Some(true);
        }
        if cli_config.follow_redirects {
            self.follow_redirects = Some(true);
        }

        // Output
        if let Some(ref suffix) = cli_config.suffix {
            self.suffix = Some(suffix.clone());
        }
        if let Some(ref output) = cli_config.output {
            self.output = Some(output.clone());
        }
        if let Some(ref timeout_file) = cli_config.timeout_file {
            self.timeout_file = Some(timeout_file.clone());
        }
        if let Some(ref redirects_file) = cli_config.redirects_file {
            self.redirects_file = Some(redirects_file.clone());
        }

        // Network
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }

        // Verbosity
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if cli_config.quiet {
            self.quiet = Some(true);
        }
        if cli_config.visual {
            self.visual = Some(true);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(ref fields) = self.fields {
            if fields.is_empty() {
                return Err(LinkScrubError::Config(
                    "At least one field to check must be given.".to_string(),
                ));
            }
            if fields.iter().any(|f| f.trim().is_empty()) {
                return Err(LinkScrubError::Config(
                    "Field names cannot be empty.".to_string(),
                ));
            }
        }

        if let Some(chunk_size) = self.chunk_size
            && chunk_size == 0
        {
            return Err(LinkScrubError::Config(
                "Chunk size cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if let Some(threads) = self.threads {
            if threads == 0 {
                return Err(LinkScrubError::Config(
                    "Thread count cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if threads > limits::MAX_THREADS {
                return Err(LinkScrubError::Config(format!(
                    "Thread count of {threads} is extremely high and may cause system instability. Consider using a smaller value."
                )));
            }
        }

        if let Some(timeout) = self.timeout {
            if !timeout.is_finite() || timeout <= 0.0 {
                return Err(LinkScrubError::Config(
                    "Timeout must be a positive number of seconds.".to_string(),
                ));
            }
            if timeout > limits::MAX_TIMEOUT_SECONDS {
                return Err(LinkScrubError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if let Some(retry) = self.retry_attempts {
            if retry == 0 {
                return Err(LinkScrubError::Config(
                    "Retry attempts cannot be 0; the initial request counts as one attempt."
                        .to_string(),
                ));
            }
            if retry > limits::MAX_RETRY_ATTEMPTS {
                return Err(LinkScrubError::Config(format!(
                    "Retry attempts of {retry} is very high and may cause long delays. Consider using a smaller value."
                )));
            }
        }

        if let Some(concurrency) = self.concurrency
            && concurrency == 0
        {
            return Err(LinkScrubError::Config(
                "Concurrency cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if let Some(max_connections) = self.max_connections
            && max_connections == 0
        {
            return Err(LinkScrubError::Config(
                "Max connections cannot be 0. Expected a positive integer.".to_string(),
            ));
        }

        if self.verbose.unwrap_or(false) && self.visual.unwrap_or(false) {
            return Err(LinkScrubError::Config(
                "Verbose logging and visual progress are mutually exclusive.".to_string(),
            ));
        }

        Ok(())
    }

    /// Configured fields, empty when none were given
    pub fn fields(&self) -> Vec<String> {
        self.fields.clone().unwrap_or_default()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(defaults::CHUNK_SIZE)
    }

    pub fn threads(&self) -> usize {
        self.threads.unwrap_or(defaults::THREADS)
    }

    /// Get timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.timeout.unwrap_or(defaults::TIMEOUT_SECONDS))
    }

    pub fn retry_attempts(&self) -> u8 {
        self.retry_attempts.unwrap_or(defaults::RETRY_ATTEMPTS)
    }

    /// Get backoff base delay as Duration
    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_millis(self.retry_delay.unwrap_or(defaults::RETRY_DELAY_MS))
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(defaults::WORKER_CONCURRENCY)
    }

    /// Global in-flight request cap; defaults to the theoretical maximum
    /// the worker pool could produce
    pub fn max_connections(&self) -> usize {
        self.max_connections
            .unwrap_or_else(|| self.threads().saturating_mul(self.concurrency()).max(1))
    }

    pub fn delete_timeouts(&self) -> bool {
        self.delete_timeouts.unwrap_or(false)
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects.unwrap_or(false)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    pub fn quiet(&self) -> bool {
        self.quiet.unwrap_or(false)
    }

    pub fn visual(&self) -> bool {
        self.visual.unwrap_or(false)
    }

    pub fn timeout_report(&self) -> Option<PathBuf> {
        self.timeout_file.as_ref().map(PathBuf::from)
    }

    pub fn redirect_report(&self) -> Option<PathBuf> {
        self.redirects_file.as_ref().map(PathBuf::from)
    }

    /// Where the cleaned dataset goes: the explicit output path if set,
    /// otherwise the input path with the suffix spliced in before the
    /// extension (`data.jsonl` → `data_cleaned.jsonl`).
    pub fn output_path(&self, input: &Path) -> PathBuf {
        if let Some(ref output) = self.output {
            return PathBuf::from(output);
        }
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let suffix = self.suffix.as_deref().unwrap_or(defaults::OUTPUT_SUFFIX);
        let name = match input.extension().and_then(|e| e.to_str()) {
            Some(extension) => format!("{stem}{suffix}.{extension}"),
            None => format!("{stem}{suffix}"),
        };
        input.with_file_name(name)
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    pub fields: Option<Vec<String>>,

    // Core options
    pub chunk_size: Option<usize>, // --chunk-size
    pub threads: Option<usize>,    // --threads
    pub timeout: Option<f64>,      // --timeout

    // Retry & backoff
    pub retry_attempts: Option<u8>,     // --retry
    pub retry_delay: Option<u64>,       // --retry-delay
    pub concurrency: Option<usize>,     // --concurrency
    pub max_connections: Option<usize>, // --max-connections

    // Cleaning policy
    pub delete_timeouts: bool,  // --delete-timeouts
    pub follow_redirects: bool, // --follow-redirects

    // Output
    pub suffix: Option<String>,         // --suffix
    pub output: Option<String>,         // --output
    pub timeout_file: Option<String>,   // --timeout-file
    pub redirects_file: Option<String>, // --redirects-file

    // Network
    pub user_agent: Option<String>, // --user-agent

    // Verbosity
    pub verbose: bool, // --verbose
    pub quiet: bool,   // --quiet
    pub visual: bool,  // --visual

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
