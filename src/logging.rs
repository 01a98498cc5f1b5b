use crate::config::Config;
use crate::stats::StatsSnapshot;
use log::{debug, error, info};
use std::path::Path;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, visual: bool) {
    let level = if visual {
        // Log lines would fight with the progress bars
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log the resolved run configuration
pub fn log_run_info(config: &Config, input: &Path) {
    debug!("Input file: {}", input.display());
    debug!("Output file: {}", config.output_path(input).display());
    debug!("Fields to check: {}", config.fields().join(", "));
    debug!(
        "Configuration: chunk_size={}, threads={}, timeout={:?}, concurrency={}, max_connections={}",
        config.chunk_size(),
        config.threads(),
        config.timeout_duration(),
        config.concurrency(),
        config.max_connections()
    );
    debug!(
        "Policy: delete_timeouts={}, follow_redirects={}",
        config.delete_timeouts(),
        config.follow_redirects()
    );
    if let Some(path) = config.timeout_report() {
        debug!("Timed-out URLs will be written to {}", path.display());
    }
    if let Some(path) = config.redirect_report() {
        debug!("Redirects will be written to {}", path.display());
    }
}

/// Log the final per-field and global statistics
pub fn log_summary(snapshot: &StatsSnapshot) {
    info!("");
    info!("Processing statistics:");
    info!("======================");

    for (field, counters) in &snapshot.fields {
        info!("");
        info!("Field: {field}");
        info!("  URLs checked: {}", counters.checked);
        info!("  Valid: {}", counters.valid);
        if counters.redirected > 0 {
            info!("  Redirected: {}", counters.redirected);
        }
        if counters.removed > 0 {
            info!("  Removed: {}", counters.removed);
        }
        if counters.timed_out > 0 {
            info!("  Timed out: {}", counters.timed_out);
        }
    }

    info!("");
    info!("Totals:");
    info!("  Lines read: {}", snapshot.lines_read);
    if snapshot.parse_errors > 0 {
        info!("  Lines skipped (parse errors): {}", snapshot.parse_errors);
    }
    info!("  Records written: {}", snapshot.records_written);
    info!("  URLs checked: {}", snapshot.total_checked());
    info!("  Valid: {}", snapshot.total_valid());
    if snapshot.total_timed_out() > 0 {
        info!("  Timed out: {}", snapshot.total_timed_out());
    }
    info!("  Elapsed: {:.1?}", snapshot.elapsed);
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Statistics;

    #[test]
    fn test_logger_initialization() {
        // Logger can only be initialized once per process
        std::panic::catch_unwind(|| init_logger(true, false)).ok();
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        let stats = Statistics::new(&["a".to_string()]);
        log_summary(&stats.snapshot());
    }

    #[test]
    fn test_log_run_info_does_not_panic() {
        let config = Config {
            fields: Some(vec!["a".to_string()]),
            timeout_file: Some("timeouts.txt".to_string()),
            ..Default::default()
        };
        log_run_info(&config, Path::new("input.jsonl"));
    }

    #[test]
    fn test_log_error_with_and_without_source() {
        let io_error = std::io::Error::other("boom");
        log_error("something failed", Some(&io_error));
        log_error("something failed", None);
    }
}
