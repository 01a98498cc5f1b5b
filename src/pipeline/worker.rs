//! Chunk processing
//!
//! A worker owns exactly one chunk at a time: it parses each line, runs
//! the transformer over the records with bounded concurrency, and writes
//! an ordered part-file into the run's scratch directory. Completion
//! order of the URL checks is irrelevant; every result is slotted back
//! into its original position before anything is written.

use futures::{StreamExt, stream};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::constants::scratch;
use crate::core::error::{LinkScrubError, Result};
use crate::transform::{Record, RecordEvent, TransformContext, transform};

/// A bounded batch of raw input lines, the unit of work for one worker.
#[derive(Debug)]
pub struct Chunk {
    /// Monotonic position of this chunk in the input stream
    pub index: usize,
    /// 1-based input line number of the first line in `lines`
    pub first_line: u64,
    pub lines: Vec<String>,
}

/// Everything a worker hands to the merger for one chunk.
#[derive(Debug)]
pub struct WorkerOutput {
    pub chunk_index: usize,
    /// Ordered serialized records, one per surviving input line
    pub part_path: PathBuf,
    pub lines_written: usize,
    pub parse_errors: usize,
    pub timeout_events: Vec<String>,
    pub redirect_events: Vec<(String, String)>,
}

enum LineResult {
    Cleaned {
        line: String,
        events: Vec<RecordEvent>,
    },
    ParseError,
}

/// Process one chunk to completion. A malformed line or a failing check
/// never aborts the chunk; only a scratch-file write error is fatal.
pub async fn process_chunk(
    chunk: Chunk,
    cx: &TransformContext,
    concurrency: usize,
    scratch_dir: &Path,
    progress: Option<&ProgressBar>,
) -> Result<WorkerOutput> {
    let Chunk {
        index,
        first_line,
        lines,
    } = chunk;
    let total = lines.len();

    // Results are slotted by original position so output order matches
    // input order no matter when each check completes.
    let mut slots: Vec<Option<String>> = vec![None; total];
    let mut parse_errors = 0usize;
    let mut timeout_events = Vec::new();
    let mut redirect_events = Vec::new();

    let mut results = stream::iter(lines.into_iter().enumerate())
        .map(|(position, line)| async move {
            let line_number = first_line + position as u64;
            (position, clean_line(&line, line_number, cx).await)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((position, result)) = results.next().await {
        match result {
            LineResult::Cleaned { line, events } => {
                slots[position] = Some(line);
                for event in events {
                    match event {
                        RecordEvent::Removed(url) => {
                            log::debug!("removed unreachable or invalid URL: {url}");
                        }
                        RecordEvent::Redirect { source, target } => {
                            log::debug!("rewrote {source} to {target}");
                            redirect_events.push((source, target));
                        }
                        RecordEvent::Timeout(url) => {
                            log::debug!("timed out: {url}");
                            timeout_events.push(url);
                        }
                    }
                }
            }
            LineResult::ParseError => {
                parse_errors += 1;
                cx.stats.add_parse_error();
            }
        }
        cx.stats.record_completed();
        if let Some(bar) = progress {
            bar.inc(1);
        }
    }
    drop(results);

    let cleaned: Vec<String> = slots.into_iter().flatten().collect();
    let lines_written = cleaned.len();
    cx.stats.add_records_written(lines_written as u64);

    let part_path = scratch_dir.join(scratch::part_file_name(index));
    write_part_file(&part_path, cleaned).await?;

    Ok(WorkerOutput {
        chunk_index: index,
        part_path,
        lines_written,
        parse_errors,
        timeout_events,
        redirect_events,
    })
}

async fn clean_line(line: &str, line_number: u64, cx: &TransformContext) -> LineResult {
    match serde_json::from_str::<Record>(line.trim()) {
        Ok(mut record) => {
            let events = transform(&mut record, cx).await;
            match serde_json::to_string(&record) {
                Ok(serialized) => LineResult::Cleaned {
                    line: serialized,
                    events,
                },
                Err(err) => {
                    log::error!("could not serialize record from line {line_number}: {err}");
                    LineResult::ParseError
                }
            }
        }
        Err(err) => {
            log::debug!("skipping malformed JSON on line {line_number}: {err}");
            LineResult::ParseError
        }
    }
}

/// The part-file is written in one burst once the whole chunk is done,
/// off the async runtime.
async fn write_part_file(path: &Path, lines: Vec<String>) -> Result<()> {
    let owned_path = path.to_path_buf();
    let write_result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&owned_path)?);
        for line in &lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    })
    .await;

    match write_result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(LinkScrubError::Write {
            path: path.display().to_string(),
            source,
        }),
        Err(join_error) => Err(LinkScrubError::Write {
            path: path.display().to_string(),
            source: std::io::Error::other(join_error),
        }),
    }
}
