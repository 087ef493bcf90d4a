use crate::chunk::{ChunkSize, ChunkUnit};
use crate::joiner::{join_chunks, JoinReport};
use crate::logging::LoggingArgs;
use crate::manifest::Manifest;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "join",
    version,
    about = "Join numbered chunk files back into a single file",
    long_about = "Join numbered chunk files back into a single file.\n\n\
        When the chunk size and number of chunks are omitted they are read from `<prefix>.meta`."
)]
pub struct JoinArgs {
    /// File to write the joined chunks to
    pub destination: PathBuf,
    /// Chunks are read from `<prefix>.<index>`, the index zero-padded to 32 digits
    pub prefix: PathBuf,
    /// Expected size of each chunk, in `--unit`s
    #[arg(requires = "num_chunks", value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,
    /// Number of chunks to join
    pub num_chunks: Option<u64>,
    #[arg(short, long, value_enum, default_value_t = ChunkUnit::Kib)]
    pub unit: ChunkUnit,
    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Where the chunk size and count of a join come from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JoinParameters {
    Explicit { chunk_size: ChunkSize, chunk_count: u64 },
    FromManifest,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JoinConfig {
    pub destination: PathBuf,
    pub prefix: PathBuf,
    pub parameters: JoinParameters,
}

impl TryFrom<JoinArgs> for JoinConfig {
    type Error = anyhow::Error;

    fn try_from(args: JoinArgs) -> Result<Self, Self::Error> {
        let parameters = match (args.chunk_size, args.num_chunks) {
            (Some(chunk_size), Some(chunk_count)) => JoinParameters::Explicit {
                chunk_size: ChunkSize::from_unit(chunk_size, args.unit)?,
                chunk_count,
            },
            (None, None) => JoinParameters::FromManifest,
            _ => anyhow::bail!("Chunk size and number of chunks must be given together"),
        };
        Ok(Self {
            destination: args.destination,
            prefix: args.prefix,
            parameters,
        })
    }
}

pub fn run(config: JoinConfig) -> anyhow::Result<JoinReport> {
    let (chunk_size, chunk_count) = match config.parameters {
        JoinParameters::Explicit {
            chunk_size,
            chunk_count,
        } => (chunk_size, chunk_count),
        JoinParameters::FromManifest => {
            let manifest = Manifest::read(&config.prefix)?;
            info!(
                "Using {} chunks of {} from {}",
                manifest.chunk_count,
                manifest.chunk_size,
                Manifest::path_for(&config.prefix).display()
            );
            (manifest.chunk_size, manifest.chunk_count)
        }
    };
    join_chunks(&config.destination, &config.prefix, chunk_size, chunk_count)
}
