//! Error types for wire parsing and validation.
//!
//! All errors are structured, testable, and carry the offending values.

use thiserror::Error;

/// Protocol-level errors from parsing and constructing packets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer ended in the middle of a field
    #[error("unexpected end of packet")]
    UnexpectedEnd,

    /// First byte is not a valid Initial long header
    #[error("invalid initial first byte: {0:#04x}")]
    InvalidFirstByte(u8),

    /// Unknown or unsupported version field
    #[error("unsupported protocol version: {0:#010x}")]
    UnsupportedVersion(u32),

    /// Connection ID exceeds the protocol bound
    #[error("connection id too long: {actual} bytes exceeds maximum {max}")]
    ConnectionIdTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length supplied
        actual: usize,
    },

    /// Packet is shorter than its Length field claims
    #[error("packet truncated: length field claims {expected} bytes, only {actual} available")]
    PacketTruncated {
        /// Bytes claimed by the Length field
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Value does not fit the 62-bit varint range
    #[error("value out of varint range: {value}")]
    VarintOutOfRange {
        /// The offending value
        value: u64,
    },

    /// Packet number outside the 62-bit space
    #[error("packet number out of range: {value}")]
    PacketNumberOutOfRange {
        /// The offending value
        value: u64,
    },
}

/// Convenient Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
