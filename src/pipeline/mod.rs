//! Partition scheduling and run orchestration
//!
//! The scheduler reads the input lazily on a blocking task, groups lines
//! into chunks, and feeds a bounded channel. A fixed pool of worker tasks
//! pulls chunks as they finish, so a slow chunk never blocks later ones.
//! Once every worker is done, the merger restores global order from the
//! per-chunk part-files.
//!
//! Scratch artifacts live in a per-run temp directory that is removed on
//! every exit path, fatal errors included.

pub mod merge;
pub mod worker;

use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};

use crate::checker::CheckUrls;
use crate::config::Config;
use crate::core::constants::scratch;
use crate::core::error::{LinkScrubError, Result};
use crate::stats::Statistics;
use crate::transform::TransformContext;
use worker::{Chunk, WorkerOutput};

/// Run the whole pipeline: schedule, transform, merge, report.
///
/// Fatal errors (unreadable input, unwritable output, a worker that died
/// before producing its chunk) abort the run; everything else is
/// recovered per record and surfaced through `stats`.
pub async fn run(
    input: &Path,
    config: &Config,
    checker: Arc<dyn CheckUrls>,
    stats: Arc<Statistics>,
    progress: Option<ProgressBar>,
) -> Result<()> {
    if !input.exists() {
        return Err(LinkScrubError::FileNotFound(input.display().to_string()));
    }

    // Removed on drop, even when the run fails after partial completion
    let scratch_dir = tempfile::Builder::new()
        .prefix(scratch::DIR_PREFIX)
        .tempdir()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (chunk_tx, chunk_rx) = mpsc::channel::<Chunk>(config.threads() * 2);
    let chunk_rx = Arc::new(Mutex::new(chunk_rx));
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<Result<WorkerOutput>>();

    let reader_handle = spawn_reader(
        input.to_path_buf(),
        config.chunk_size(),
        chunk_tx,
        Arc::clone(&stats),
        Arc::clone(&shutdown),
    );

    let cx = Arc::new(TransformContext {
        fields: config.fields(),
        follow_redirects: config.follow_redirects(),
        delete_timeouts: config.delete_timeouts(),
        checker,
        stats: Arc::clone(&stats),
    });

    let mut worker_handles = Vec::with_capacity(config.threads());
    for _ in 0..config.threads() {
        let chunk_rx = Arc::clone(&chunk_rx);
        let result_tx = result_tx.clone();
        let cx = Arc::clone(&cx);
        let stats = Arc::clone(&stats);
        let scratch_path = scratch_dir.path().to_path_buf();
        let progress = progress.clone();
        let concurrency = config.concurrency();

        worker_handles.push(tokio::spawn(async move {
            loop {
                // Workers pull chunks as they finish; the lock only
                // guards who waits on the channel next
                let chunk = { chunk_rx.lock().await.recv().await };
                let Some(chunk) = chunk else { break };

                let output =
                    worker::process_chunk(chunk, &cx, concurrency, &scratch_path, progress.as_ref())
                        .await;
                stats.chunk_completed();
                if result_tx.send(output).is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let mut outputs = Vec::new();
    let mut first_error: Option<LinkScrubError> = None;
    while let Some(result) = result_rx.recv().await {
        match result {
            Ok(output) => {
                log::info!(
                    "chunk {} with {} records processed (total: {})",
                    output.chunk_index,
                    output.lines_written + output.parse_errors,
                    stats.progress().records_completed
                );
                outputs.push(output);
            }
            Err(err) => {
                // No new chunks after a fatal error; in-flight checks
                // finish or time out naturally
                shutdown.store(true, Ordering::Relaxed);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    for handle in worker_handles {
        if let Err(err) = handle.await {
            // A dead worker means a missing chunk; merge turns that into
            // a WorkerFailure
            log::error!("worker task failed: {err}");
        }
    }

    let chunk_count = match reader_handle.await {
        Ok(read_result) => read_result?,
        Err(err) => return Err(LinkScrubError::Io(std::io::Error::other(err))),
    };

    if let Some(err) = first_error {
        return Err(err);
    }

    merge::merge(
        outputs,
        chunk_count,
        &config.output_path(input),
        config.timeout_report().as_deref(),
        config.redirect_report().as_deref(),
    )
}

/// Lazily read the input into chunks on a blocking task. Returns the
/// number of chunks dispatched; an IO error while reading is fatal.
fn spawn_reader(
    input: PathBuf,
    chunk_size: usize,
    chunk_tx: mpsc::Sender<Chunk>,
    stats: Arc<Statistics>,
    shutdown: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<Result<usize>> {
    tokio::task::spawn_blocking(move || {
        let read_error = |source| LinkScrubError::Read {
            path: input.display().to_string(),
            source,
        };
        let file = File::open(&input).map_err(read_error)?;
        let reader = BufReader::new(file);

        let mut buffer: Vec<String> = Vec::with_capacity(chunk_size);
        let mut index = 0usize;
        let mut first_line = 1u64;
        let mut line_number = 0u64;

        for line in reader.lines() {
            if shutdown.load(Ordering::Relaxed) {
                return Ok(index);
            }
            let line = line.map_err(read_error)?;
            line_number += 1;
            stats.add_line_read();
            buffer.push(line);

            if buffer.len() >= chunk_size {
                let chunk = Chunk {
                    index,
                    first_line,
                    lines: mem::take(&mut buffer),
                };
                stats.chunk_dispatched();
                if chunk_tx.blocking_send(chunk).is_err() {
                    return Ok(index);
                }
                index += 1;
                first_line = line_number + 1;
            }
        }

        if !buffer.is_empty() && !shutdown.load(Ordering::Relaxed) {
            let chunk = Chunk {
                index,
                first_line,
                lines: mem::take(&mut buffer),
            };
            stats.chunk_dispatched();
            if chunk_tx.blocking_send(chunk).is_ok() {
                index += 1;
            }
        }

        Ok(index)
    })
}
