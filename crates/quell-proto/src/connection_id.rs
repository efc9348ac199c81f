//! Connection identifiers.

use crate::errors::{ProtocolError, Result};

/// Maximum connection ID length in bytes.
pub const MAX_CID_LEN: usize = 20;

/// An opaque connection identifier.
///
/// The client picks the destination connection ID for its first flight;
/// both endpoints feed the same bytes into Initial key derivation.
/// Stored inline, no heap. Zero length is representable (legal in other
/// packet types) but rejected where key derivation needs input.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId {
    bytes: [u8; MAX_CID_LEN],
    len: u8,
}

impl ConnectionId {
    /// Create a connection ID from raw bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ConnectionIdTooLong` if `bytes` exceeds 20 bytes
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_CID_LEN {
            return Err(ProtocolError::ConnectionIdTooLong {
                max: MAX_CID_LEN,
                actual: bytes.len(),
            });
        }

        let mut buf = [0u8; MAX_CID_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { bytes: buf, len: bytes.len() as u8 })
    }

    /// Length in bytes (0 to 20).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// True for the zero-length connection ID.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for ConnectionId {
    fn as_ref(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl std::fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConnectionId(")?;
        for byte in self.as_ref() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.as_ref() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
