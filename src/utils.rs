use byte_unit::{AdjustedByte, Byte, UnitType};
use std::ops::Range;

pub fn display_bytes(size: u64) -> AdjustedByte {
    Byte::from(size).get_appropriate_unit(UnitType::Binary)
}

/// Yields the consecutive byte ranges of length `chunk_size` covering `0..size`.
/// The final range holds the remainder and is never empty.
pub fn byte_range_chunks(size: u64, chunk_size: u64) -> impl Iterator<Item = Range<u64>> {
    let step = usize::try_from(chunk_size).unwrap_or(usize::MAX);
    (0..size).step_by(step).map(move |byte_start| {
        let byte_end = byte_start.saturating_add(chunk_size).min(size);
        byte_start..byte_end
    })
}
