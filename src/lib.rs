//! Split files into numbered fixed-size chunks and join them back together.
//!
//! Chunk files are named `<prefix>.<index>` with the index zero-padded to
//! 32 decimal digits, so they list in index order. Sizes are always bytes
//! below the command line layer.

pub mod chunk;
pub mod cmd;
mod io_utils;
pub mod joiner;
pub mod logging;
pub mod manifest;
mod progress;
pub mod splitter;
#[cfg(test)]
mod test_utils;
pub mod utils;
