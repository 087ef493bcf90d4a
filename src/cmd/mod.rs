use clap::Parser;

pub mod join;
pub mod split;

/// Parses the command line, exiting with status 1 on invalid arguments.
/// `--help` and `--version` still exit with status 0.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 })
        }
    }
}
