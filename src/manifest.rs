use crate::chunk::ChunkSize;
use anyhow::{bail, Context};
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const MANIFEST_EXTENSION: &str = "meta";

/// Parameters needed to reassemble a split file, stored next to its chunks as
/// `<prefix>.meta`: the chunk count on the first line, the chunk size in bytes
/// on the second.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Manifest {
    pub chunk_count: u64,
    pub chunk_size: ChunkSize,
}

impl Manifest {
    pub fn path_for(prefix: &Path) -> PathBuf {
        let mut name = OsString::from(prefix.as_os_str());
        name.push(".");
        name.push(MANIFEST_EXTENSION);
        PathBuf::from(name)
    }

    pub fn read(prefix: &Path) -> anyhow::Result<Self> {
        let path = Self::path_for(prefix);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read manifest {}", path.display()))?;
        let manifest = content
            .parse()
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        debug!("Read {manifest} from {}", path.display());
        Ok(manifest)
    }

    pub fn write(&self, prefix: &Path) -> anyhow::Result<PathBuf> {
        let path = Self::path_for(prefix);
        std::fs::write(&path, self.to_file_contents())
            .with_context(|| format!("Could not write manifest {}", path.display()))?;
        Ok(path)
    }

    pub fn to_file_contents(&self) -> String {
        format!("{}\n{}\n", self.chunk_count, self.chunk_size.as_u64())
    }
}

impl Display for Manifest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Manifest chunks={} chunk_size={}", self.chunk_count, self.chunk_size)
    }
}

impl FromStr for Manifest {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<_> = s.trim_end().lines().map(str::trim).collect();
        let [count, size] = lines.as_slice() else {
            bail!("Expected 2 lines (chunk count, chunk size), found {}", lines.len());
        };
        let chunk_count = count
            .parse()
            .with_context(|| format!("Invalid chunk count {count:?}"))?;
        let chunk_size = size
            .parse()
            .with_context(|| format!("Invalid chunk size {size:?}"))?;
        Ok(Self {
            chunk_count,
            chunk_size: ChunkSize::from_bytes(chunk_size)?,
        })
    }
}
