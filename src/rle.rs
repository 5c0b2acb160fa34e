//! Bit-level run-length codec, explicit-flag wire format.
//!
//! Each encoded block is self-describing: a 1-bit value flag followed by
//! a 7-bit run length, so a block occupies exactly one byte on the wire
//! and carries no alternation assumption. A run longer than
//! `MAX_RUN_LEN` is split into consecutive blocks of the same value.
//! Zero-length blocks decode as no-ops, which makes trailing zero
//! padding at the byte transport harmless.

use crate::bitio::{BitRead, BitWrite};
use crate::error::{BitIoError, Error, FormatError, Result};

/// Width of the run-length field in bits
pub const BLOCK_LEN: usize = 7;
/// Longest run a single block can represent
pub const MAX_RUN_LEN: u64 = (1 << BLOCK_LEN) - 1;

/// Compresses a bit stream from a reader to a writer using run-length
/// encoding.
///
/// Consumes the reader to exhaustion. The writer is not closed; the
/// caller owns it and must close it on every exit path.
///
/// # Errors
/// Returns an error if the underlying streams fail mid-transfer.
pub fn compress_rle(input: &mut impl BitRead, output: &mut impl BitWrite) -> Result<()> {
    if input.is_empty()? {
        // Zero input bits encode as zero blocks
        return Ok(());
    }

    let mut target = input.read_bit()?;
    // The first bit of the run is already consumed
    let mut count: u64 = 1;

    while !input.is_empty()? {
        let bit = input.read_bit()?;
        if bit == target {
            // Run continues; split it only once it outgrows a block,
            // so a run of exactly MAX_RUN_LEN stays a single block
            if count == MAX_RUN_LEN {
                write_block(output, target, count)?;
                count = 0;
            }
            count += 1;
        } else {
            // This bit is the first of a new run
            write_block(output, target, count)?;
            target = bit;
            count = 1;
        }
    }

    // The last run hasn't been written yet
    write_block(output, target, count)?;
    Ok(())
}

/// Expands a run-length encoded bit stream from a reader to a writer.
///
/// Consumes the reader to exhaustion and reproduces the original bits
/// exactly. The writer is not closed; the caller owns it.
///
/// # Errors
/// Returns a format error if the stream ends partway through a block,
/// rather than emitting partial output silently.
pub fn expand_rle(input: &mut impl BitRead, output: &mut impl BitWrite) -> Result<()> {
    while !input.is_empty()? {
        let value = input.read_bit()?;
        let count = read_run_len(input)?;
        for _ in 0..count {
            output.write_bit(value)?;
        }
    }
    Ok(())
}

fn write_block(output: &mut impl BitWrite, value: bool, count: u64) -> Result<()> {
    output.write_bit(value)?;
    output.write_uint(count, BLOCK_LEN)?;
    Ok(())
}

fn read_run_len(input: &mut impl BitRead) -> Result<u64> {
    match input.read_uint(BLOCK_LEN) {
        Ok(count) => Ok(count),
        // Running out mid-field means the stream was cut off, which is
        // a wire-format violation rather than a clean end of input
        Err(Error::BitIo(BitIoError::UnexpectedEof)) => {
            Err(FormatError::TruncatedBlock { width: BLOCK_LEN }.into())
        }
        Err(e) => Err(e),
    }
}

// --- Buffer-based helper functions for testing ---

#[allow(dead_code)]
/// Compresses a byte buffer's bits using RLE (buffer-based wrapper).
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    use crate::bitio::{BitReader, BitWriter};
    use std::io::Cursor;

    let mut reader = BitReader::new(Cursor::new(input));
    let mut compressed = Vec::new();
    let mut writer = BitWriter::new(&mut compressed);
    compress_rle(&mut reader, &mut writer)?;
    writer.close()?;
    Ok(compressed)
}

#[allow(dead_code)]
/// Expands an RLE-encoded byte buffer (buffer-based wrapper).
pub fn expand(input: &[u8]) -> Result<Vec<u8>> {
    use crate::bitio::{BitReader, BitWriter};
    use std::io::Cursor;

    let mut reader = BitReader::new(Cursor::new(input));
    let mut expanded = Vec::new();
    let mut writer = BitWriter::new(&mut expanded);
    expand_rle(&mut reader, &mut writer)?;
    writer.close()?;
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitio::mem::{MemBitReader, MemBitWriter};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Compress an exact in-memory bit sequence and decode the emitted
    /// (value, length) blocks for inspection.
    fn compress_to_blocks(bits: &str) -> Vec<(bool, u64)> {
        let mut reader = MemBitReader::from_str(bits);
        let mut writer = MemBitWriter::new();
        compress_rle(&mut reader, &mut writer).expect("compression failed");
        assert_eq!(writer.bits.len() % (1 + BLOCK_LEN), 0);

        let mut blocks = Vec::new();
        let mut encoded = MemBitReader::new(writer.bits);
        while !encoded.is_empty().unwrap() {
            let value = encoded.read_bit().unwrap();
            let count = encoded.read_uint(BLOCK_LEN).unwrap();
            blocks.push((value, count));
        }
        blocks
    }

    fn roundtrip(bits: &str) -> String {
        let mut reader = MemBitReader::from_str(bits);
        let mut encoded = MemBitWriter::new();
        compress_rle(&mut reader, &mut encoded).expect("compression failed");

        let mut decoder = MemBitReader::new(encoded.bits);
        let mut decoded = MemBitWriter::new();
        expand_rle(&mut decoder, &mut decoded).expect("expansion failed");
        decoded.to_bit_string()
    }

    #[test]
    fn test_alternation_scenario() {
        // 000111000 -> (0,3),(1,3),(0,3)
        let blocks = compress_to_blocks("000111000");
        assert_eq!(blocks, vec![(false, 3), (true, 3), (false, 3)]);
        assert_eq!(roundtrip("000111000"), "000111000");
    }

    #[test]
    fn test_cap_boundary_scenario() {
        // 300 ones then 5 zeros splits the long run at the cap
        let input = format!("{}{}", "1".repeat(300), "0".repeat(5));
        let blocks = compress_to_blocks(&input);
        assert_eq!(
            blocks,
            vec![(true, 127), (true, 127), (true, 46), (false, 5)]
        );
        assert_eq!(roundtrip(&input), input);
    }

    #[test]
    fn test_single_run_emits_single_block() {
        for k in [1u64, 2, 64, 126, 127] {
            let input = "1".repeat(k as usize);
            let blocks = compress_to_blocks(&input);
            assert_eq!(blocks, vec![(true, k)], "run of {k} ones");
            assert_eq!(roundtrip(&input), input);
        }
    }

    #[test]
    fn test_run_just_past_cap() {
        let input = "0".repeat(128);
        let blocks = compress_to_blocks(&input);
        assert_eq!(blocks, vec![(false, 127), (false, 1)]);
        assert_eq!(roundtrip(&input), input);
    }

    #[test]
    fn test_empty_input() {
        let blocks = compress_to_blocks("");
        assert!(blocks.is_empty());
        assert_eq!(roundtrip(""), "");
    }

    #[test]
    fn test_single_bit_inputs() {
        assert_eq!(compress_to_blocks("0"), vec![(false, 1)]);
        assert_eq!(compress_to_blocks("1"), vec![(true, 1)]);
        assert_eq!(roundtrip("0"), "0");
        assert_eq!(roundtrip("1"), "1");
    }

    #[test]
    fn test_zero_length_blocks_are_noops() {
        // Blocks (1,0)(0,0), as trailing byte padding would decode
        let mut decoder = MemBitReader::from_str("1000000000000000");
        let mut decoded = MemBitWriter::new();
        expand_rle(&mut decoder, &mut decoded).unwrap();
        assert!(decoded.bits.is_empty());
    }

    #[test]
    fn test_truncated_block_fails() {
        // A full block is 8 bits; cut the length field short
        let mut decoder = MemBitReader::from_str("10000");
        let mut decoded = MemBitWriter::new();
        let err = expand_rle(&mut decoder, &mut decoded).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::TruncatedBlock { width: BLOCK_LEN })
        ));
    }

    #[test]
    fn test_compression_is_deterministic() {
        let input: String = (0..500).map(|i| if i % 7 < 3 { '1' } else { '0' }).collect();
        assert_eq!(compress_to_blocks(&input), compress_to_blocks(&input));
    }

    #[test]
    fn test_byte_buffer_roundtrip() {
        let input = [0x00u8, 0x00, 0xFF, 0xFF, 0xFF, 0x0F, 0xAA];
        let compressed = compress(&input).expect("buffer compression failed");
        let expanded = expand(&compressed).expect("buffer expansion failed");
        assert_eq!(expanded, input.to_vec());
    }

    #[test]
    fn test_sparse_bitmap_compresses() {
        // A run-dominated bitmap must shrink
        let mut input = vec![0u8; 1000];
        input[400] = 0x01;
        input[800] = 0x80;
        let compressed = compress(&input).unwrap();
        assert!(compressed.len() < input.len() / 4);
        assert_eq!(expand(&compressed).unwrap(), input);
    }

    #[test]
    fn test_random_roundtrips() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let len = rng.gen_range(0..2000);
            // Biased toward long runs, with some incompressible stretches
            let flip_pct = rng.gen_range(1..=50);
            let mut bits = Vec::with_capacity(len);
            let mut current = rng.gen_bool(0.5);
            for _ in 0..len {
                if rng.gen_range(0..100) < flip_pct {
                    current = !current;
                }
                bits.push(current);
            }

            let mut reader = MemBitReader::new(bits.clone());
            let mut encoded = MemBitWriter::new();
            compress_rle(&mut reader, &mut encoded).unwrap();
            let mut decoder = MemBitReader::new(encoded.bits);
            let mut decoded = MemBitWriter::new();
            expand_rle(&mut decoder, &mut decoded).unwrap();
            assert_eq!(decoded.bits, bits);
        }
    }
}
