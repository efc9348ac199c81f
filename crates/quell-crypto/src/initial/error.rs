//! Error types for Initial packet protection

use thiserror::Error;

/// Errors from Initial packet protection operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Initial keys need the client-chosen destination connection ID
    #[error("empty destination connection id")]
    EmptyConnectionId,

    /// Header encodes different packet number bytes than the number
    /// being sealed
    #[error("packet number mismatch: header encodes {header}, sealing {sealing}")]
    PacketNumberMismatch {
        /// Truncated number read back from the header
        header: u64,
        /// Truncation of the number being sealed
        sealing: u64,
    },

    /// Packet ends before a complete field or protection sample
    #[error("packet too short: need {expected} bytes, have {actual}")]
    PacketTooShort {
        /// Bytes needed
        expected: usize,
        /// Bytes present
        actual: usize,
    },

    /// AEAD authentication tag mismatch
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl CryptoError {
    /// Returns true if this error rejects one packet (drop and move on)
    ///
    /// Rejections are the expected outcome for forged, corrupted, or
    /// truncated packets from the network. The remaining errors mean
    /// the caller assembled inconsistent arguments: a bug, not
    /// untrusted input.
    pub fn is_rejection(&self) -> bool {
        match self {
            // Untrusted input - drop the packet
            Self::AuthenticationFailed => true,
            Self::PacketTooShort { .. } => true,

            // Caller contract violations
            Self::EmptyConnectionId => false,
            Self::PacketNumberMismatch { .. } => false,
        }
    }
}
