use crate::chunk::{ChunkSize, ChunkUnit};
use crate::logging::LoggingArgs;
use crate::splitter::{split_file, SplitSummary};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "split", version, about = "Split a file into numbered fixed-size chunks", long_about = None)]
pub struct SplitArgs {
    /// File to split
    pub source: PathBuf,
    /// Chunks are written to `<prefix>.<index>`, the index zero-padded to 32 digits
    pub prefix: PathBuf,
    /// Size of each chunk, in `--unit`s
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: u64,
    #[arg(short, long, value_enum, default_value_t = ChunkUnit::Kib)]
    pub unit: ChunkUnit,
    /// Do not write `<prefix>.meta`
    #[arg(long)]
    pub no_manifest: bool,
    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SplitConfig {
    pub source: PathBuf,
    pub prefix: PathBuf,
    pub chunk_size: ChunkSize,
    pub write_manifest: bool,
}

impl TryFrom<SplitArgs> for SplitConfig {
    type Error = anyhow::Error;

    fn try_from(args: SplitArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            chunk_size: ChunkSize::from_unit(args.chunk_size, args.unit)?,
            source: args.source,
            prefix: args.prefix,
            write_manifest: !args.no_manifest,
        })
    }
}

pub fn run(config: SplitConfig) -> anyhow::Result<SplitSummary> {
    split_file(
        &config.source,
        &config.prefix,
        config.chunk_size,
        config.write_manifest,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{chunk_files, patterned_bytes, write_file};
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<SplitArgs, clap::Error> {
        SplitArgs::try_parse_from(std::iter::once("split").chain(args.iter().copied()))
    }

    #[test]
    fn test_kibibytes_by_default() {
        let config = SplitConfig::try_from(parse(&["src.bin", "out/part", "4"]).unwrap()).unwrap();
        assert_eq!(config.chunk_size.as_u64(), 4096);
        assert_eq!(config.source, PathBuf::from("src.bin"));
        assert_eq!(config.prefix, PathBuf::from("out/part"));
        assert!(config.write_manifest);
    }

    #[test]
    fn test_unit_and_manifest_flags() {
        let args = parse(&["src.bin", "part", "100", "--unit", "bytes", "--no-manifest", "-vv"]).unwrap();
        assert_eq!(args.logging.verbose, 2);
        let config = SplitConfig::try_from(args).unwrap();
        assert_eq!(config.chunk_size.as_u64(), 100);
        assert!(!config.write_manifest);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(parse(&["src.bin", "part"]).is_err());
        assert!(parse(&["src.bin", "part", "0"]).is_err());
        assert!(parse(&["src.bin", "part", "-4"]).is_err());
        assert!(parse(&["src.bin", "part", "4k"]).is_err());
        assert!(parse(&["src.bin", "part", "4", "extra"]).is_err());
        assert!(parse(&["src.bin", "part", "4", "--unit", "mib"]).is_err());
    }

    #[test]
    fn test_overflowing_chunk_size() {
        let args = parse(&["src.bin", "part", &u64::MAX.to_string()]).unwrap();
        assert!(SplitConfig::try_from(args).is_err());
    }

    #[test]
    fn test_run() {
        let dir = TempDir::new().unwrap();
        let source = write_file(dir.path().join("source.bin"), &patterned_bytes(2048));
        let prefix = dir.path().join("part");
        let args = parse(&[source.to_str().unwrap(), prefix.to_str().unwrap(), "1"]).unwrap();

        let summary = run(SplitConfig::try_from(args).unwrap()).unwrap();
        assert_eq!(summary.chunk_count, 2);
        assert_eq!(chunk_files(dir.path(), "part").len(), 2);
        assert!(dir.path().join("part.meta").exists());
    }
}
