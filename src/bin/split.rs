use file_chunker::cmd::parse_args;
use file_chunker::cmd::split::{run, SplitArgs, SplitConfig};

fn main() -> anyhow::Result<()> {
    let args: SplitArgs = parse_args();
    file_chunker::logging::init(args.logging);
    let config = SplitConfig::try_from(args)?;
    run(config)?;
    Ok(())
}
