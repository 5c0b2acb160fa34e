//! Bit-stream capabilities consumed by the codecs.
//!
//! `BitRead` and `BitWrite` abstract over where the bits live, so the
//! codecs can be tested against in-memory streams while the binary wires
//! them to stdin/stdout. The stream-backed implementations operate
//! MSB-first (the first bit written becomes the most significant bit of
//! the first byte), and the writer zero-pads the final partial byte on
//! close.

use std::io::{ErrorKind, Read, Write};

use crate::error::{BitIoError, Result};

/// Read side of a bit stream.
pub trait BitRead {
    /// Read a single bit. Errors with `BitIoError::UnexpectedEof` past
    /// the end of the stream.
    fn read_bit(&mut self) -> Result<bool>;

    /// Read `width` bits (MSB-first) as an unsigned integer.
    ///
    /// Errors if `width > 64` or if fewer than `width` bits remain.
    fn read_uint(&mut self, width: usize) -> Result<u64> {
        if width > 64 {
            return Err(BitIoError::InvalidBitWidth(width).into());
        }
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// True once no bits remain. May need to probe the underlying
    /// stream, hence `&mut self` and a fallible return.
    fn is_empty(&mut self) -> Result<bool>;
}

/// Write side of a bit stream.
pub trait BitWrite {
    /// Append a single bit.
    fn write_bit(&mut self, bit: bool) -> Result<()>;

    /// Append the low `width` bits of `value`, MSB-first.
    ///
    /// Errors if `width > 64` or if `value` does not fit in `width` bits.
    fn write_uint(&mut self, value: u64, width: usize) -> Result<()> {
        if width > 64 {
            return Err(BitIoError::InvalidBitWidth(width).into());
        }
        if width < 64 && value >> width != 0 {
            return Err(BitIoError::ValueTooWide { value, width }.into());
        }
        for shift in (0..width).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }
}

/// Reads bits MSB-first from an underlying byte stream.
///
/// Holds at most one byte of lookahead; `is_empty` probes the stream for
/// the next byte when the current one is spent.
pub struct BitReader<R> {
    backing: R,
    /// Current byte being consumed
    buf: u8,
    /// Bits of `buf` not yet consumed (0-8)
    nbits: usize,
    /// Set once the backing stream reported end-of-stream
    eof: bool,
}

impl<R: Read> BitReader<R> {
    pub fn new(backing: R) -> Self {
        Self {
            backing,
            buf: 0,
            nbits: 0,
            eof: false,
        }
    }

    /// Pull the next byte from the backing stream. Only called with an
    /// empty buffer.
    fn refill(&mut self) -> Result<()> {
        let mut byte = [0u8; 1];
        loop {
            match self.backing.read(&mut byte) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(_) => {
                    self.buf = byte[0];
                    self.nbits = 8;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read> BitRead for BitReader<R> {
    fn read_bit(&mut self) -> Result<bool> {
        if self.is_empty()? {
            return Err(BitIoError::UnexpectedEof.into());
        }
        self.nbits -= 1;
        Ok((self.buf >> self.nbits) & 1 == 1)
    }

    fn is_empty(&mut self) -> Result<bool> {
        if self.nbits == 0 && !self.eof {
            self.refill()?;
        }
        Ok(self.nbits == 0)
    }
}

/// Writes bits MSB-first to an underlying byte stream.
///
/// # Invariants
/// - `nbits` is always < 8; a full byte is flushed immediately
pub struct BitWriter<W: Write> {
    backing: W,
    /// Accumulator for the current partial byte (low-aligned)
    buf: u8,
    /// Number of bits in `buf` (0-7)
    nbits: usize,
}

impl<W: Write> BitWriter<W> {
    pub fn new(backing: W) -> Self {
        Self {
            backing,
            buf: 0,
            nbits: 0,
        }
    }

    /// Finish writing: pad the final partial byte with zero bits, flush
    /// the backing stream, and release it.
    ///
    /// Must be called on every exit path, including after a codec
    /// failure, so no buffered bits are lost.
    pub fn close(mut self) -> Result<()> {
        if self.nbits > 0 {
            let towrite = self.buf << (8 - self.nbits);
            self.backing.write_all(&[towrite])?;
            self.nbits = 0;
        }
        self.backing.flush()?;
        Ok(())
    }
}

impl<W: Write> BitWrite for BitWriter<W> {
    fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buf = (self.buf << 1) | u8::from(bit);
        self.nbits += 1;
        if self.nbits == 8 {
            let towrite = self.buf;
            self.buf = 0;
            self.nbits = 0;
            self.backing.write_all(&[towrite])?;
        }
        Ok(())
    }
}
