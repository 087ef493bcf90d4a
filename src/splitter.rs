use crate::chunk::{plan_chunks, Chunk, ChunkSize};
use crate::io_utils::new_bufwriter;
use crate::manifest::Manifest;
use crate::progress::progress_iter;
use crate::utils::display_bytes;
use anyhow::{bail, Context};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SplitSummary {
    pub source_size: u64,
    pub chunk_size: ChunkSize,
    pub chunk_count: u64,
    pub manifest: Option<PathBuf>,
}

/// Splits `source` into `<prefix>.<index>` chunk files of `chunk_size` bytes.
///
/// Nothing is written if the source cannot be opened. A failure while writing a
/// chunk stops the split immediately; chunks written before it are left in place.
/// When `write_manifest` is set, `<prefix>.meta` is written once every chunk exists.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn split_file(
    source: &Path,
    prefix: &Path,
    chunk_size: ChunkSize,
    write_manifest: bool,
) -> anyhow::Result<SplitSummary> {
    let mut file =
        File::open(source).with_context(|| format!("Could not open source file {}", source.display()))?;
    let metadata = file
        .metadata()
        .with_context(|| format!("Could not get the size of {}", source.display()))?;
    if !metadata.is_file() {
        bail!("Source {} is not a regular file", source.display());
    }
    let source_size = metadata.len();

    let chunk_count = chunk_size.chunk_count(source_size);
    info!(
        "Splitting {} ({:#.1}) into {} chunks of {}",
        source.display(),
        display_bytes(source_size),
        chunk_count,
        chunk_size
    );

    write_chunks(
        &mut file,
        prefix,
        plan_chunks(source_size, chunk_size),
        chunk_count,
        create_chunk_file,
    )?;

    let manifest = if write_manifest {
        let manifest = Manifest {
            chunk_count,
            chunk_size,
        };
        let path = manifest.write(prefix)?;
        debug!("Wrote {manifest} to {}", path.display());
        Some(path)
    } else {
        None
    };

    info!("done... [{chunk_count}] chunks produced for {}", source.display());

    Ok(SplitSummary {
        source_size,
        chunk_size,
        chunk_count,
        manifest,
    })
}

/// Writes each chunk to the writer `open` returns for its path, stopping at the first error.
fn write_chunks<W: Write>(
    source: &mut impl Read,
    prefix: &Path,
    chunks: impl Iterator<Item = Chunk>,
    chunk_count: u64,
    mut open: impl FnMut(&Path) -> anyhow::Result<W>,
) -> anyhow::Result<()> {
    for chunk in progress_iter("Writing chunks", chunk_count, chunks) {
        let path = chunk.path(prefix);
        info!("starting {}", path.display());
        debug!("{chunk}");

        let mut writer = open(&path)?;
        copy_chunk(source, &mut writer, &chunk, &path)?;
    }
    Ok(())
}

fn create_chunk_file(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let output = File::create(path).with_context(|| format!("Could not open output file {}", path.display()))?;
    Ok(new_bufwriter(output))
}

fn copy_chunk(source: &mut impl Read, writer: &mut impl Write, chunk: &Chunk, path: &Path) -> anyhow::Result<()> {
    let copied = std::io::copy(&mut source.by_ref().take(chunk.size()), writer)
        .with_context(|| format!("Error writing chunk {}", path.display()))?;
    if copied != chunk.size() {
        bail!(
            "Unexpected end of source while writing {}: expected {} bytes, read {}",
            path.display(),
            chunk.size(),
            copied
        );
    }
    writer
        .flush()
        .with_context(|| format!("Error writing to output file {}", path.display()))?;
    Ok(())
}
