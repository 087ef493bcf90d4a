use crate::chunk::{chunk_path, ChunkSize};
use crate::io_utils::new_bufwriter;
use crate::progress::progress_iter;
use crate::utils::display_bytes;
use anyhow::Context;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// A problem with a single chunk file, recorded while joining continues.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ChunkFault {
    Missing { path: PathBuf, reason: String },
    Short { path: PathBuf, expected: u64, actual: u64 },
    Oversized { path: PathBuf, expected: u64, actual: u64 },
}

impl ChunkFault {
    pub fn is_missing(&self) -> bool {
        matches!(self, ChunkFault::Missing { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            ChunkFault::Missing { path, .. }
            | ChunkFault::Short { path, .. }
            | ChunkFault::Oversized { path, .. } => path,
        }
    }
}

impl Display for ChunkFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkFault::Missing { path, reason } => {
                write!(f, "Could not open chunk file {} ({reason})", path.display())
            }
            ChunkFault::Short {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Incorrect chunk size for file {}. Expected: {expected}, Actual: {actual}",
                path.display()
            ),
            ChunkFault::Oversized {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Chunk file {} is larger than the chunk size. Expected: {expected}, Actual: {actual}",
                path.display()
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error("{} of {chunk_count} chunk files are missing, reassembly failed", .missing.len())]
    MissingChunks {
        destination: PathBuf,
        chunk_count: u64,
        missing: Vec<ChunkFault>,
    },
    #[error(
        "{} chunk files have an incorrect size, {} might be incomplete or corrupted",
        .faults.len(),
        .destination.display()
    )]
    IncorrectSize {
        destination: PathBuf,
        faults: Vec<ChunkFault>,
    },
}

impl JoinError {
    pub fn faults(&self) -> &[ChunkFault] {
        match self {
            JoinError::MissingChunks { missing, .. } => missing,
            JoinError::IncorrectSize { faults, .. } => faults,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JoinReport {
    pub chunk_count: u64,
    pub bytes_written: u64,
}

struct CopyOutcome {
    bytes_written: u64,
    faults: Vec<ChunkFault>,
}

/// Concatenates `<prefix>.0` to `<prefix>.<chunk_count - 1>` into `destination`.
///
/// Missing and mis-sized chunks do not stop the join: every index is visited so
/// that all faults are reported together, then
/// - any missing chunk removes `destination` and fails with [`JoinError::MissingChunks`],
/// - otherwise any size fault keeps `destination` and fails with [`JoinError::IncorrectSize`].
///
/// Only the last chunk may be shorter than `chunk_size`. Errors writing the
/// destination are fatal and also remove it.
#[instrument(skip_all, fields(destination = %destination.display()))]
pub fn join_chunks(
    destination: &Path,
    prefix: &Path,
    chunk_size: ChunkSize,
    chunk_count: u64,
) -> anyhow::Result<JoinReport> {
    let file = File::create(destination)
        .with_context(|| format!("Could not open destination file {}", destination.display()))?;
    info!(
        "Joining {chunk_count} chunks of {chunk_size} into {}",
        destination.display()
    );
    join_into(destination, new_bufwriter(file), prefix, chunk_size, chunk_count)
}

/// Joins into `writer`, which was opened on `destination`, and applies the
/// fault policy of [`join_chunks`].
fn join_into(
    destination: &Path,
    mut writer: impl Write,
    prefix: &Path,
    chunk_size: ChunkSize,
    chunk_count: u64,
) -> anyhow::Result<JoinReport> {
    let outcome = copy_chunks(&mut writer, prefix, chunk_size, chunk_count).and_then(|outcome| {
        writer
            .flush()
            .with_context(|| format!("Error writing to destination file {}", destination.display()))?;
        Ok(outcome)
    });
    drop(writer);

    let CopyOutcome { bytes_written, faults } = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            remove_destination(destination);
            return Err(e);
        }
    };

    let (missing, size_faults): (Vec<_>, Vec<_>) = faults.into_iter().partition(ChunkFault::is_missing);
    if !missing.is_empty() {
        error!("One or more chunk files are missing. Reassembly failed.");
        remove_destination(destination);
        return Err(JoinError::MissingChunks {
            destination: destination.to_path_buf(),
            chunk_count,
            missing,
        }
        .into());
    }
    if !size_faults.is_empty() {
        warn!(
            "One or more chunk files have an incorrect size: {}",
            size_faults.iter().map(|f| f.path().display()).join(", ")
        );
        return Err(JoinError::IncorrectSize {
            destination: destination.to_path_buf(),
            faults: size_faults,
        }
        .into());
    }

    info!(
        "done... [{chunk_count}] chunks joined into {} ({:#.1})",
        destination.display(),
        display_bytes(bytes_written)
    );
    Ok(JoinReport {
        chunk_count,
        bytes_written,
    })
}

fn copy_chunks(
    writer: &mut impl Write,
    prefix: &Path,
    chunk_size: ChunkSize,
    chunk_count: u64,
) -> anyhow::Result<CopyOutcome> {
    let expected = chunk_size.as_u64();
    let mut buffer = vec![];
    let mut faults = vec![];
    let mut bytes_written = 0;

    for index in progress_iter("Joining chunks", chunk_count, 0..chunk_count) {
        let path = chunk_path(prefix, index);
        let is_last = index + 1 == chunk_count;
        info!("putting {}", path.display());

        buffer.clear();
        let actual = match read_chunk(&path, expected, &mut buffer) {
            Ok(actual) => actual,
            Err(e) => {
                let fault = ChunkFault::Missing {
                    path,
                    reason: e.to_string(),
                };
                error!("{fault}");
                faults.push(fault);
                continue;
            }
        };

        writer
            .write_all(&buffer)
            .with_context(|| format!("Error writing to destination from chunk {}", path.display()))?;
        bytes_written += buffer.len() as u64;

        let fault = if actual > expected {
            Some(ChunkFault::Oversized {
                path,
                expected,
                actual,
            })
        } else if !is_last && actual < expected {
            Some(ChunkFault::Short {
                path,
                expected,
                actual,
            })
        } else {
            None
        };
        if let Some(fault) = fault {
            warn!("{fault}");
            faults.push(fault);
        }
    }

    Ok(CopyOutcome { bytes_written, faults })
}

/// Reads at most `limit` bytes of the chunk at `path` into `buffer` and
/// returns the chunk file's full length.
fn read_chunk(path: &Path, limit: u64, buffer: &mut Vec<u8>) -> std::io::Result<u64> {
    let mut file = File::open(path)?;
    let read = (&mut file).take(limit).read_to_end(buffer)? as u64;
    let file_len = match file.metadata() {
        Ok(metadata) => metadata.len().max(read),
        Err(e) => {
            debug!("Could not stat {}: {e}", path.display());
            read
        }
    };
    Ok(file_len)
}

fn remove_destination(destination: &Path) {
    match std::fs::remove_file(destination) {
        Ok(()) => debug!("Removed {}", destination.display()),
        Err(e) => warn!("Could not remove {}: {e}", destination.display()),
    }
}
