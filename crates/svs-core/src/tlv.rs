//! NDN Type-Length-Value primitives.
//!
//! Types and lengths are TL-numbers: a value below 253 is a single byte,
//! larger values are a marker byte followed by a big-endian integer:
//!
//! | value range               | encoding             |
//! |---------------------------|----------------------|
//! | `0..=252`                 | 1 byte               |
//! | `253..=0xFFFF`            | `0xFD` + 2 bytes     |
//! | `0x1_0000..=0xFFFF_FFFF`  | `0xFE` + 4 bytes     |
//! | larger                    | `0xFF` + 8 bytes     |
//!
//! Non-negative integer payloads use the smallest of 1, 2, 4 or 8 bytes.
//! All multi-byte integers are big-endian.

use crate::error::{CodecError, Result};

const MARKER_U16: u8 = 0xFD;
const MARKER_U32: u8 = 0xFE;
const MARKER_U64: u8 = 0xFF;

/// Number of bytes [`encode_tl_num`] writes for `value`.
pub const fn tl_num_size(value: u64) -> usize {
    if value < MARKER_U16 as u64 {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Append a TL-number to `buf`.
pub fn encode_tl_num(buf: &mut Vec<u8>, value: u64) {
    if value < MARKER_U16 as u64 {
        buf.push(value as u8);
    } else if value <= 0xFFFF {
        buf.push(MARKER_U16);
        buf.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= 0xFFFF_FFFF {
        buf.push(MARKER_U32);
        buf.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        buf.push(MARKER_U64);
        buf.extend_from_slice(&value.to_be_bytes());
    }
}

/// Decode a TL-number at the start of `buf`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_tl_num(buf: &[u8]) -> Result<(u64, usize)> {
    let mut reader = Reader::new(buf);
    let value = reader.read_tl_num()?;
    Ok((value, reader.position()))
}

/// Number of bytes [`encode_nonneg_int`] writes for `value`.
pub const fn nonneg_int_size(value: u64) -> usize {
    if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else if value <= 0xFFFF_FFFF {
        4
    } else {
        8
    }
}

/// Append `value` in the smallest of 1, 2, 4 or 8 big-endian bytes.
pub fn encode_nonneg_int(buf: &mut Vec<u8>, value: u64) {
    match nonneg_int_size(value) {
        1 => buf.push(value as u8),
        2 => buf.extend_from_slice(&(value as u16).to_be_bytes()),
        4 => buf.extend_from_slice(&(value as u32).to_be_bytes()),
        _ => buf.extend_from_slice(&value.to_be_bytes()),
    }
}

/// Decode a 1, 2, 4 or 8 byte big-endian integer.
///
/// Any other width is rejected. Non-minimal widths are accepted.
pub fn decode_nonneg_int(bytes: &[u8]) -> Result<u64> {
    match *bytes {
        [b] => Ok(b as u64),
        [a, b] => Ok(u16::from_be_bytes([a, b]) as u64),
        [a, b, c, d] => Ok(u32::from_be_bytes([a, b, c, d]) as u64),
        [a, b, c, d, e, f, g, h] => Ok(u64::from_be_bytes([a, b, c, d, e, f, g, h])),
        _ => Err(CodecError::UnsupportedSeqWidth(bytes.len())),
    }
}

/// Total encoded size of a TLV element with a `value_len` byte payload.
pub const fn tlv_size(typ: u64, value_len: usize) -> usize {
    tl_num_size(typ) + tl_num_size(value_len as u64) + value_len
}

/// Append a full TLV element.
pub fn encode_tlv(buf: &mut Vec<u8>, typ: u64, value: &[u8]) {
    encode_tl_num(buf, typ);
    encode_tl_num(buf, value.len() as u64);
    buf.extend_from_slice(value);
}

/// Bounds-checked cursor over an encoded buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the whole buffer has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(CodecError::LengthMismatch {
                declared: n as u64,
                available: self.remaining() as u64,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Read one TL-number.
    pub fn read_tl_num(&mut self) -> Result<u64> {
        let first = self.read_bytes(1)?[0];
        let value = match first {
            MARKER_U16 => decode_nonneg_int(self.read_bytes(2)?)?,
            MARKER_U32 => decode_nonneg_int(self.read_bytes(4)?)?,
            MARKER_U64 => decode_nonneg_int(self.read_bytes(8)?)?,
            small => small as u64,
        };
        Ok(value)
    }

    /// Read a type number and check it equals `expected`.
    pub fn expect_type(&mut self, expected: u64) -> Result<()> {
        let found = self.read_tl_num()?;
        if found != expected {
            return Err(CodecError::MalformedTag { expected, found });
        }
        Ok(())
    }

    /// Read a length and check it fits in the rest of the buffer.
    pub fn read_length(&mut self) -> Result<usize> {
        let declared = self.read_tl_num()?;
        let available = self.remaining() as u64;
        if declared > available {
            return Err(CodecError::LengthMismatch { declared, available });
        }
        Ok(declared as usize)
    }
}
