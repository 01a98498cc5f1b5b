//! Ordered reassembly of worker outputs
//!
//! This is the only place global ordering is restored: part-files are
//! concatenated strictly by chunk index. A missing chunk is a fatal
//! error, because silently skipping it would break the line
//! correspondence between input and output.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::worker::WorkerOutput;
use crate::core::error::{LinkScrubError, Result};

/// Concatenate all part-files in chunk order into `output_path` and write
/// the optional timeout/redirect reports.
pub fn merge(
    mut outputs: Vec<WorkerOutput>,
    expected_chunks: usize,
    output_path: &Path,
    timeout_report: Option<&Path>,
    redirect_report: Option<&Path>,
) -> Result<()> {
    outputs.sort_by_key(|output| output.chunk_index);
    verify_complete(&outputs, expected_chunks)?;

    let mut writer = BufWriter::new(create_for_write(output_path)?);
    for output in &outputs {
        let mut part = File::open(&output.part_path).map_err(|source| LinkScrubError::Read {
            path: output.part_path.display().to_string(),
            source,
        })?;
        io::copy(&mut part, &mut writer).map_err(|source| write_error(output_path, source))?;
    }
    writer
        .flush()
        .map_err(|source| write_error(output_path, source))?;

    if let Some(path) = timeout_report {
        let urls: BTreeSet<&str> = outputs
            .iter()
            .flat_map(|output| output.timeout_events.iter().map(String::as_str))
            .collect();
        if !urls.is_empty() {
            write_report(path, urls.into_iter().map(str::to_string))?;
            log::debug!("timeout report written to {}", path.display());
        }
    }

    if let Some(path) = redirect_report {
        let pairs: BTreeSet<(&str, &str)> = outputs
            .iter()
            .flat_map(|output| {
                output
                    .redirect_events
                    .iter()
                    .map(|(source, target)| (source.as_str(), target.as_str()))
            })
            .collect();
        if !pairs.is_empty() {
            write_report(
                path,
                pairs
                    .into_iter()
                    .map(|(source, target)| format!("{source};{target}")),
            )?;
            log::debug!("redirect report written to {}", path.display());
        }
    }

    Ok(())
}

/// Every chunk index in `0..expected` must be present exactly once.
fn verify_complete(outputs: &[WorkerOutput], expected: usize) -> Result<()> {
    for (position, output) in outputs.iter().enumerate() {
        if output.chunk_index != position {
            return Err(LinkScrubError::WorkerFailure {
                chunk_index: position,
            });
        }
    }
    if outputs.len() < expected {
        return Err(LinkScrubError::WorkerFailure {
            chunk_index: outputs.len(),
        });
    }
    Ok(())
}

fn write_report<I: Iterator<Item = String>>(path: &Path, lines: I) -> Result<()> {
    let mut writer = BufWriter::new(create_for_write(path)?);
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|source| write_error(path, source))?;
    }
    writer.flush().map_err(|source| write_error(path, source))
}

fn create_for_write(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: io::Error) -> LinkScrubError {
    LinkScrubError::Write {
        path: path.display().to_string(),
        source,
    }
}
