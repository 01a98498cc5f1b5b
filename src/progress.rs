use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Visual progress for a run: one overall bar counting processed records.
///
/// Workers hold a clone of the underlying `ProgressBar` (cheap, it is an
/// Arc internally) and tick it per completed record. When disabled, every
/// method is a no-op so callers never have to branch.
pub struct ProgressReporter {
    multi_progress: Arc<MultiProgress>,
    run_progress: Option<ProgressBar>,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: Arc::new(MultiProgress::new()),
            run_progress: None,
            enabled,
        }
    }

    pub fn start_run(&mut self, total_lines: u64) {
        if !self.enabled {
            return;
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_lines));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records cleaned ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message("Cleaning records");
        pb.enable_steady_tick(Duration::from_millis(120));
        self.run_progress = Some(pb);
    }

    /// Handle for workers to tick; None while disabled or not started.
    pub fn run_bar(&self) -> Option<ProgressBar> {
        self.run_progress.clone()
    }

    pub fn finish_run(&self, records: u64, timeouts: u64) {
        if let Some(ref pb) = self.run_progress {
            let message = if timeouts == 0 {
                format!("✓ {records} records cleaned")
            } else {
                format!("✓ {records} records cleaned ({timeouts} URLs timed out)")
            };
            pb.finish_with_message(message);
        }
    }

    pub fn finish_and_clear(&self) {
        if self.enabled {
            // Clear the progress bar and add a blank line
            self.multi_progress.clear().unwrap_or(());
            println!();
        }
    }

    pub fn log_warning(&self, message: &str) {
        if self.enabled {
            self.multi_progress
                .println(format!("⚠ {message}"))
                .unwrap_or(());
        }
    }

    pub fn log_error(&self, message: &str) {
        if self.enabled {
            self.multi_progress
                .println(format!("✗ {message}"))
                .unwrap_or(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = ProgressReporter::new(true);
        assert!(reporter.enabled);
        assert!(reporter.run_progress.is_none());
        assert!(reporter.run_bar().is_none());
    }

    #[test]
    fn test_progress_reporter_disabled() {
        let mut reporter = ProgressReporter::new(false);

        // These should not panic even when disabled
        reporter.start_run(100);
        assert!(reporter.run_bar().is_none());
        reporter.finish_run(100, 0);
        reporter.log_warning("test");
        reporter.log_error("test");
    }

    #[test]
    fn test_enabled_progress_reporter() {
        let mut reporter = ProgressReporter::new(true);

        reporter.start_run(10);
        assert!(reporter.run_progress.is_some());

        let bar = reporter.run_bar().expect("bar should exist after start");
        bar.inc(3);
        assert_eq!(bar.position(), 3);

        reporter.finish_run(10, 2);
    }

    #[test]
    fn test_progress_zero_values() {
        let mut reporter = ProgressReporter::new(true);

        reporter.start_run(0);
        reporter.finish_run(0, 0);
    }

    #[test]
    fn test_progress_reporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProgressReporter>();
    }
}
