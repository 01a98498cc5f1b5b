//! Thread-safe statistics aggregation
//!
//! Every worker records check outcomes concurrently through atomic
//! counters; nothing here takes a lock. Counters are pre-allocated from
//! the configured field list at run start, so recording is a plain map
//! lookup plus two `fetch_add` calls. The finalized snapshot is an
//! immutable value type taken only after all workers are done.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How one checked URL was classified, for counting purposes.
///
/// Exactly one kind is recorded per checked URL, which keeps the
/// invariant `checked == valid + removed + redirected + timed_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// Reachable and kept as-is
    Valid,
    /// Deleted: invalid syntax or confirmed absent (404/410)
    Removed,
    /// Answered with a redirect (kept or rewritten per policy)
    Redirected,
    /// Timed out or failed at the connection level
    TimedOut,
}

#[derive(Debug, Default)]
struct FieldCounters {
    checked: AtomicU64,
    valid: AtomicU64,
    removed: AtomicU64,
    redirected: AtomicU64,
    timed_out: AtomicU64,
}

/// Shared, concurrently-updated statistics for one run.
#[derive(Debug)]
pub struct Statistics {
    fields: HashMap<String, FieldCounters>,
    lines_read: AtomicU64,
    parse_errors: AtomicU64,
    records_written: AtomicU64,
    records_completed: AtomicU64,
    chunks_dispatched: AtomicU64,
    chunks_completed: AtomicU64,
    started: Instant,
}

/// Read-only progress counters for the progress-reporting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounters {
    pub lines_read: u64,
    pub records_completed: u64,
    pub chunks_dispatched: u64,
    pub chunks_completed: u64,
}

/// Finalized per-field counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub checked: u64,
    pub valid: u64,
    pub removed: u64,
    pub redirected: u64,
    pub timed_out: u64,
}

/// Immutable snapshot of a finished (or aborted) run.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Per-field counters, sorted by field name
    pub fields: Vec<(String, FieldSnapshot)>,
    pub lines_read: u64,
    pub parse_errors: u64,
    pub records_written: u64,
    pub elapsed: Duration,
}

impl Statistics {
    /// Counters are allocated up front for the configured fields; the map
    /// itself is never mutated afterwards, so no locking is needed.
    pub fn new(fields: &[String]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|name| (name.clone(), FieldCounters::default()))
                .collect(),
            lines_read: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            records_completed: AtomicU64::new(0),
            chunks_dispatched: AtomicU64::new(0),
            chunks_completed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Record one classified URL check for `field`.
    pub fn record(&self, field: &str, kind: CheckKind) {
        let Some(counters) = self.fields.get(field) else {
            // Unconfigured field names cannot reach here through the
            // transformer; ignore rather than poison the run.
            return;
        };
        counters.checked.fetch_add(1, Ordering::Relaxed);
        let counter = match kind {
            CheckKind::Valid => &counters.valid,
            CheckKind::Removed => &counters.removed,
            CheckKind::Redirected => &counters.redirected,
            CheckKind::TimedOut => &counters.timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_written(&self, count: u64) {
        self.records_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.records_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn chunk_dispatched(&self) {
        self.chunks_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn chunk_completed(&self) {
        self.chunks_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Live progress counters, safe to poll from any thread.
    pub fn progress(&self) -> ProgressCounters {
        ProgressCounters {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            records_completed: self.records_completed.load(Ordering::Relaxed),
            chunks_dispatched: self.chunks_dispatched.load(Ordering::Relaxed),
            chunks_completed: self.chunks_completed.load(Ordering::Relaxed),
        }
    }

    /// Finalize into an immutable snapshot. Call only after all workers
    /// are done; counters read later would not be reflected.
    pub fn snapshot(&self) -> StatsSnapshot {
        let mut fields: Vec<(String, FieldSnapshot)> = self
            .fields
            .iter()
            .map(|(name, counters)| {
                (
                    name.clone(),
                    FieldSnapshot {
                        checked: counters.checked.load(Ordering::Relaxed),
                        valid: counters.valid.load(Ordering::Relaxed),
                        removed: counters.removed.load(Ordering::Relaxed),
                        redirected: counters.redirected.load(Ordering::Relaxed),
                        timed_out: counters.timed_out.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        StatsSnapshot {
            fields,
            lines_read: self.lines_read.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

impl StatsSnapshot {
    /// Sum of `checked` over all fields.
    pub fn total_checked(&self) -> u64 {
        self.fields.iter().map(|(_, f)| f.checked).sum()
    }

    /// Sum of `valid` over all fields.
    pub fn total_valid(&self) -> u64 {
        self.fields.iter().map(|(_, f)| f.valid).sum()
    }

    /// Sum of `timed_out` over all fields.
    pub fn total_timed_out(&self) -> u64 {
        self.fields.iter().map(|(_, f)| f.timed_out).sum()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use std::sync::Arc;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record__increments_checked_and_kind() {
        let stats = Statistics::new(&fields(&["a"]));
        stats.record("a", CheckKind::Valid);
        stats.record("a", CheckKind::Removed);
        stats.record("a", CheckKind::Redirected);
        stats.record("a", CheckKind::TimedOut);

        let snapshot = stats.snapshot();
        let (name, counters) = &snapshot.fields[0];
        assert_eq!(name, "a");
        assert_eq!(counters.checked, 4);
        assert_eq!(counters.valid, 1);
        assert_eq!(counters.removed, 1);
        assert_eq!(counters.redirected, 1);
        assert_eq!(counters.timed_out, 1);
    }

    #[test]
    fn test_record__unknown_field_is_ignored() {
        let stats = Statistics::new(&fields(&["a"]));
        stats.record("unconfigured", CheckKind::Valid);
        assert_eq!(stats.snapshot().total_checked(), 0);
    }

    #[test]
    fn test_snapshot__fields_sorted_by_name() {
        let stats = Statistics::new(&fields(&["zeta", "alpha", "mid"]));
        let snapshot = stats.snapshot();
        let names: Vec<&str> = snapshot.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_checked_identity_holds() {
        let stats = Statistics::new(&fields(&["a", "b"]));
        for i in 0..100u64 {
            let kind = match i % 4 {
                0 => CheckKind::Valid,
                1 => CheckKind::Removed,
                2 => CheckKind::Redirected,
                _ => CheckKind::TimedOut,
            };
            stats.record(if i % 2 == 0 { "a" } else { "b" }, kind);
        }
        for (_, f) in stats.snapshot().fields {
            assert_eq!(f.checked, f.valid + f.removed + f.redirected + f.timed_out);
        }
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let stats = Arc::new(Statistics::new(&fields(&["a"])));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.record("a", CheckKind::Valid);
                    stats.add_line_read();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.fields[0].1.checked, 8000);
        assert_eq!(snapshot.fields[0].1.valid, 8000);
        assert_eq!(snapshot.lines_read, 8000);
    }

    #[test]
    fn test_progress_counters() {
        let stats = Statistics::new(&fields(&["a"]));
        stats.add_line_read();
        stats.add_line_read();
        stats.chunk_dispatched();
        stats.chunk_completed();
        stats.record_completed();

        let progress = stats.progress();
        assert_eq!(progress.lines_read, 2);
        assert_eq!(progress.chunks_dispatched, 1);
        assert_eq!(progress.chunks_completed, 1);
        assert_eq!(progress.records_completed, 1);
    }
}
