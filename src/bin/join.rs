use file_chunker::cmd::join::{run, JoinArgs, JoinConfig};
use file_chunker::cmd::parse_args;

fn main() -> anyhow::Result<()> {
    let args: JoinArgs = parse_args();
    file_chunker::logging::init(args.logging);
    let config = JoinConfig::try_from(args)?;
    run(config)?;
    Ok(())
}
