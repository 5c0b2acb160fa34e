//! Legacy run-length wire format with implicit alternating run values.
//!
//! Blocks carry only an 8-bit run length; the run value is implied,
//! starting at `0` and flipping after every block. A stream whose first
//! run is ones therefore opens with a zero-length block, and a run
//! capped at `MAX_RUN_LEN` is continued by flipping twice through a
//! zero-length block. Not interchangeable with the explicit-flag format
//! in `rle`; kept for bit-for-bit compatibility with existing encoded
//! streams.

use crate::bitio::{BitRead, BitWrite};
use crate::error::{BitIoError, Error, FormatError, Result};

/// Width of the run-length field in bits
pub const BLOCK_LEN: usize = 8;
/// Longest run a single block can represent
pub const MAX_RUN_LEN: u64 = (1 << BLOCK_LEN) - 1;

/// Compresses a bit stream into the alternating-run format.
///
/// The writer is not closed; the caller owns it.
pub fn compress_alternating(input: &mut impl BitRead, output: &mut impl BitWrite) -> Result<()> {
    if input.is_empty()? {
        return Ok(());
    }

    // Runs are assumed to start with zeros; a leading zero-length block
    // signals that the first bit is actually a one
    let mut target = input.read_bit()?;
    if target {
        output.write_uint(0, BLOCK_LEN)?;
    }

    let mut count: u64 = 1;
    while !input.is_empty()? {
        let bit = input.read_bit()?;
        if bit != target {
            // First bit of the next run has just been read
            output.write_uint(count, BLOCK_LEN)?;
            target = !target;
            count = 1;
        } else {
            count += 1;
            if count == MAX_RUN_LEN {
                output.write_uint(count, BLOCK_LEN)?;
                // Count restarts at 0: if the run continues, the next
                // differing-from-target bit emits a zero-length block,
                // flipping the decoder back to the same value
                count = 0;
                target = !target;
            }
        }
    }

    // The last run hasn't been written yet; a zero-length block here is
    // valid when the input ended exactly on a cap boundary
    output.write_uint(count, BLOCK_LEN)?;
    Ok(())
}

/// Expands an alternating-run encoded bit stream.
///
/// The writer is not closed; the caller owns it.
pub fn expand_alternating(input: &mut impl BitRead, output: &mut impl BitWrite) -> Result<()> {
    let mut value = false;
    while !input.is_empty()? {
        let count = match input.read_uint(BLOCK_LEN) {
            Ok(count) => count,
            Err(Error::BitIo(BitIoError::UnexpectedEof)) => {
                return Err(FormatError::TruncatedBlock { width: BLOCK_LEN }.into())
            }
            Err(e) => return Err(e),
        };
        for _ in 0..count {
            output.write_bit(value)?;
        }
        value = !value;
    }
    Ok(())
}
