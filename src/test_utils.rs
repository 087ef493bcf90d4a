use crate::chunk::{ChunkSize, INDEX_WIDTH};
use itertools::Itertools;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Deterministic, non-repeating-per-chunk content for round trip checks.
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn write_file(path: impl AsRef<Path>, content: &[u8]) -> PathBuf {
    let path = path.as_ref().to_path_buf();
    std::fs::write(&path, content).unwrap();
    path
}

pub fn chunk_size(bytes: u64) -> ChunkSize {
    ChunkSize::from_bytes(bytes).unwrap()
}

/// Chunk files for `prefix_name` inside `dir`, in name order. Manifests are skipped.
pub fn chunk_files(dir: &Path, prefix_name: &str) -> Vec<PathBuf> {
    let stem = format!("{prefix_name}.");
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            let name = path.file_name().unwrap().to_str().unwrap();
            match name.strip_prefix(&stem) {
                Some(index) => index.len() == INDEX_WIDTH && index.bytes().all(|b| b.is_ascii_digit()),
                None => false,
            }
        })
        .sorted()
        .collect()
}

pub fn file_sizes(paths: &[PathBuf]) -> Vec<u64> {
    paths
        .iter()
        .map(|p| std::fs::metadata(p).unwrap().len())
        .collect()
}

/// Accepts `limit` bytes, then fails every write like a full disk.
pub struct FullDiskWriter<W> {
    inner: W,
    remaining: usize,
}

impl<W: Write> FullDiskWriter<W> {
    pub fn new(inner: W, limit: usize) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }
}

impl<W: Write> Write for FullDiskWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Err(std::io::Error::other("No space left on device"));
        }
        let len = buf.len().min(self.remaining);
        let written = self.inner.write(&buf[..len])?;
        self.remaining -= written;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
