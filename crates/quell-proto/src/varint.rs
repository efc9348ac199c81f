//! Variable-length integer encoding.
//!
//! The two high bits of the first byte select the width (1, 2, 4 or 8
//! bytes); the remaining bits carry the value big-endian. Values fit
//! 62 bits.

use bytes::{Buf, BufMut};

use crate::errors::{ProtocolError, Result};

/// Largest value a varint can carry (2^62 - 1).
pub const MAX: u64 = (1 << 62) - 1;

/// Number of bytes the encoding of `value` occupies.
///
/// Values above [`MAX`] have no encoding; this reports 8 for them, the
/// answer [`encode`] would have used before rejecting the value.
#[must_use]
pub fn size(value: u64) -> usize {
    if value < 1 << 6 {
        1
    } else if value < 1 << 14 {
        2
    } else if value < 1 << 30 {
        4
    } else {
        8
    }
}

/// Append the varint encoding of `value` to `buf`.
///
/// # Errors
///
/// - `ProtocolError::VarintOutOfRange` if `value` needs more than 62
///   bits
pub fn encode(value: u64, buf: &mut impl BufMut) -> Result<()> {
    if value < 1 << 6 {
        buf.put_u8(value as u8);
    } else if value < 1 << 14 {
        buf.put_u16(value as u16 | 0b01 << 14);
    } else if value < 1 << 30 {
        buf.put_u32(value as u32 | 0b10 << 30);
    } else if value <= MAX {
        buf.put_u64(value | 0b11 << 62);
    } else {
        return Err(ProtocolError::VarintOutOfRange { value });
    }
    Ok(())
}

/// Decode one varint from the front of `buf`.
///
/// # Errors
///
/// - `ProtocolError::UnexpectedEnd` if `buf` ends inside the encoding
pub fn decode(buf: &mut impl Buf) -> Result<u64> {
    if buf.remaining() < 1 {
        return Err(ProtocolError::UnexpectedEnd);
    }
    let first = buf.get_u8();
    let tail_len = (1usize << (first >> 6)) - 1;
    if buf.remaining() < tail_len {
        return Err(ProtocolError::UnexpectedEnd);
    }

    let mut value = u64::from(first & 0x3f);
    for _ in 0..tail_len {
        value = value << 8 | u64::from(buf.get_u8());
    }
    Ok(value)
}
