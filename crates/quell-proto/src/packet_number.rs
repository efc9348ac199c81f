//! Packet numbers and their truncated wire encodings.
//!
//! Full packet numbers live in a 62-bit space but travel as 1 to 4
//! trailing bytes of the header, with the width carried in the low two
//! bits of the first byte. The receiver reconstructs the full number
//! from the truncated bytes and the largest number it has seen, using
//! a window centered one past that largest value.

use crate::errors::{ProtocolError, Result};

/// Width of a truncated packet number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PacketNumberLen {
    /// One byte.
    One = 1,
    /// Two bytes.
    Two = 2,
    /// Three bytes.
    Three = 3,
    /// Four bytes.
    Four = 4,
}

impl PacketNumberLen {
    /// Decode the width from the low two bits of an unprotected first
    /// byte.
    #[must_use]
    pub fn from_first_byte(first: u8) -> Self {
        match first & 0b11 {
            0 => Self::One,
            1 => Self::Two,
            2 => Self::Three,
            _ => Self::Four,
        }
    }

    /// The two low bits this width contributes to the first byte.
    #[must_use]
    pub fn first_byte_bits(self) -> u8 {
        self as u8 - 1
    }

    /// Width in bytes.
    #[must_use]
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Mask selecting the low bits kept by this width.
    #[must_use]
    pub fn mask(self) -> u64 {
        (1u64 << (8 * self as u64)) - 1
    }
}

/// A full packet number in the 62-bit space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketNumber(u64);

impl PacketNumber {
    /// Largest representable packet number (2^62 - 1).
    pub const MAX: Self = Self((1 << 62) - 1);

    /// Create a packet number.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::PacketNumberOutOfRange` above 2^62 - 1
    pub fn new(value: u64) -> Result<Self> {
        if value > Self::MAX.0 {
            return Err(ProtocolError::PacketNumberOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// The raw 62-bit value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Low bytes of this number at the given width.
    #[must_use]
    pub fn truncated(self, len: PacketNumberLen) -> u64 {
        self.0 & len.mask()
    }

    /// Smallest width that lets the receiver recover this number, given
    /// the largest packet number acknowledged so far.
    ///
    /// Never narrower than two bytes: the one-byte window does not
    /// survive modest reordering.
    #[must_use]
    pub fn encoded_len(self, largest_acked: Option<Self>) -> PacketNumberLen {
        let num_unacked = match largest_acked {
            Some(acked) => self.0.saturating_sub(acked.0),
            None => self.0 + 1,
        };

        if num_unacked < 1 << 15 {
            PacketNumberLen::Two
        } else if num_unacked < 1 << 23 {
            PacketNumberLen::Three
        } else {
            PacketNumberLen::Four
        }
    }

    /// Recover the full packet number from its truncated encoding.
    ///
    /// `largest` is the highest packet number received so far in this
    /// space, or `None` before the first packet. The candidate closest
    /// to one past `largest` wins; ties at the window edges resolve
    /// toward larger numbers.
    #[must_use]
    pub fn expand(truncated: u64, len: PacketNumberLen, largest: Option<Self>) -> Self {
        let expected = largest.map_or(0, |pn| pn.0 + 1);
        let win = 1u64 << (8 * len.bytes() as u64);
        let hwin = win / 2;
        let mask = win - 1;

        let candidate = (expected & !mask) | (truncated & mask);
        if expected.checked_sub(hwin).is_some_and(|low| candidate <= low)
            && candidate + win <= Self::MAX.0
        {
            Self(candidate + win)
        } else if candidate > expected + hwin && candidate >= win {
            Self(candidate - win)
        } else if candidate > Self::MAX.0 {
            // expected can sit one past MAX when largest is at the top
            // of the space; the candidate window must stay inside it
            Self(candidate - win)
        } else {
            Self(candidate)
        }
    }
}

impl std::fmt::Display for PacketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
