use crate::utils::{byte_range_chunks, display_bytes};
use anyhow::{bail, Context};
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU64;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Number of decimal digits in a chunk file's index suffix.
pub const INDEX_WIDTH: usize = 32;

const KIBIBYTE: u64 = 1024;

/// Unit a chunk size is expressed in on the command line.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, strum::Display, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum ChunkUnit {
    Bytes,
    #[default]
    Kib,
}

impl ChunkUnit {
    pub fn multiplier(self) -> u64 {
        match self {
            ChunkUnit::Bytes => 1,
            ChunkUnit::Kib => KIBIBYTE,
        }
    }
}

/// A non-zero chunk size, always held in bytes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ChunkSize(NonZeroU64);

impl ChunkSize {
    pub fn from_bytes(bytes: u64) -> anyhow::Result<Self> {
        match NonZeroU64::new(bytes) {
            Some(size) => Ok(Self(size)),
            None => bail!("Chunk size must be a positive integer"),
        }
    }

    pub fn from_unit(value: u64, unit: ChunkUnit) -> anyhow::Result<Self> {
        let bytes = value
            .checked_mul(unit.multiplier())
            .with_context(|| format!("Chunk size {value} {unit} is too large"))?;
        Self::from_bytes(bytes)
    }

    pub fn as_u64(self) -> u64 {
        self.0.get()
    }

    /// Number of chunks needed to hold `source_size` bytes.
    pub fn chunk_count(self, source_size: u64) -> u64 {
        source_size.div_ceil(self.as_u64())
    }
}

impl Display for ChunkSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#.1}", display_bytes(self.as_u64()))
    }
}

/// One contiguous slice of a source file, stored as its own file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Chunk {
    pub index: u64,
    pub byte_range: Range<u64>,
}

impl Chunk {
    pub fn size(&self) -> u64 {
        self.byte_range.end - self.byte_range.start
    }

    pub fn path(&self, prefix: &Path) -> PathBuf {
        chunk_path(prefix, self.index)
    }
}

impl Display for Chunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk index={} range={:?} size={:#.1}",
            self.index,
            self.byte_range,
            display_bytes(self.size())
        )
    }
}

/// Lazily splits `source_size` bytes into chunks of `chunk_size`, the last one
/// holding the remainder. Yields [`ChunkSize::chunk_count`] chunks.
pub fn plan_chunks(source_size: u64, chunk_size: ChunkSize) -> impl Iterator<Item = Chunk> {
    byte_range_chunks(source_size, chunk_size.as_u64())
        .zip(0..)
        .map(|(byte_range, index)| Chunk { index, byte_range })
}

/// `<prefix>.<index>` with the index zero-padded to [`INDEX_WIDTH`] digits, so
/// chunk names sort lexicographically in index order.
pub fn chunk_path(prefix: &Path, index: u64) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(format!(".{index:0width$}", width = INDEX_WIDTH));
    PathBuf::from(name)
}
