//! linkscrub validates and cleans URLs embedded in JSON Lines datasets.
//!
//! For each configured record field (a single URL string or an array of
//! them), the pipeline checks syntactic validity and live reachability,
//! deletes or rewrites dead values, and writes a cleaned dataset whose
//! lines correspond one-to-one with the parseable input lines. Timed-out
//! URLs and followed redirects can additionally be written to report
//! files, and per-field statistics are collected throughout.
//!
//! Processing is chunked: a scheduler partitions the input stream, a
//! pool of workers cleans chunks concurrently (each with its own bounded
//! check concurrency), and a final merge step restores global order from
//! the per-chunk scratch artifacts.

pub mod checker;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod stats;
pub mod transform;

// Re-export the types most callers need
pub use crate::checker::{CheckOutcome, CheckUrls, HttpChecker};
pub use crate::config::{CliConfig, Config};
pub use crate::core::error::{LinkScrubError, Result};
pub use crate::stats::{CheckKind, Statistics, StatsSnapshot};
pub use crate::transform::{Record, RecordEvent, TransformContext};
