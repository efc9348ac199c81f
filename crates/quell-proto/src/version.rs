//! Protocol versions and their Initial-phase constants.
//!
//! The salt and expand labels used for Initial key derivation are fixed
//! per protocol version and public. Both endpoints must use the table
//! row matching the version in the packet header, or derivation yields
//! unrelated keys and every packet fails authentication.

use crate::errors::{ProtocolError, Result};

/// Length of an Initial salt in bytes.
pub const SALT_LEN: usize = 20;

/// Supported protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// QUIC version 1 (RFC 9000).
    V1,
    /// Draft 29, kept for interop with pre-standard deployments.
    Draft29,
}

/// Constants for Initial packet protection under one version.
///
/// A future version that renames a salt or label is a new row in this
/// table; the derivation code never changes.
#[derive(Debug, Clone, Copy)]
pub struct InitialParams {
    /// HKDF-Extract salt for the Initial secret.
    pub salt: &'static [u8; SALT_LEN],
    /// Expand label for the AEAD key.
    pub key_label: &'static [u8],
    /// Expand label for the AEAD base IV.
    pub iv_label: &'static [u8],
    /// Expand label for the header protection key.
    pub hp_label: &'static [u8],
}

const SALT_V1: [u8; SALT_LEN] = [
    0x38, 0x76, 0x2c, 0xf7, 0xf5, 0x59, 0x34, 0xb3, 0x4d, 0x17, 0x9a, 0xe6, 0xa4, 0xc8, 0x0c,
    0xad, 0xcc, 0xbb, 0x7f, 0x0a,
];

const SALT_DRAFT29: [u8; SALT_LEN] = [
    0xaf, 0xbf, 0xec, 0x28, 0x99, 0x93, 0xd2, 0x4c, 0x9e, 0x97, 0x86, 0xf1, 0x9c, 0x61, 0x11,
    0xe0, 0x43, 0x90, 0xa8, 0x99,
];

const PARAMS_V1: InitialParams = InitialParams {
    salt: &SALT_V1,
    key_label: b"quic key",
    iv_label: b"quic iv",
    hp_label: b"quic hp",
};

const PARAMS_DRAFT29: InitialParams = InitialParams {
    salt: &SALT_DRAFT29,
    key_label: b"quic key",
    iv_label: b"quic iv",
    hp_label: b"quic hp",
};

impl Version {
    /// Wire encoding of version 1.
    pub const V1_WIRE: u32 = 0x0000_0001;

    /// Wire encoding of draft 29.
    pub const DRAFT29_WIRE: u32 = 0xff00_001d;

    /// Parse a version from its 32-bit wire encoding.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnsupportedVersion` for any value not in the
    ///   supported set
    pub fn from_wire(wire: u32) -> Result<Self> {
        match wire {
            Self::V1_WIRE => Ok(Self::V1),
            Self::DRAFT29_WIRE => Ok(Self::Draft29),
            other => Err(ProtocolError::UnsupportedVersion(other)),
        }
    }

    /// The 32-bit wire encoding of this version.
    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::V1 => Self::V1_WIRE,
            Self::Draft29 => Self::DRAFT29_WIRE,
        }
    }

    /// Initial-phase constants for this version.
    #[must_use]
    pub fn initial_params(self) -> InitialParams {
        match self {
            Self::V1 => PARAMS_V1,
            Self::Draft29 => PARAMS_DRAFT29,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        for version in [Version::V1, Version::Draft29] {
            assert_eq!(Version::from_wire(version.to_wire()), Ok(version));
        }
    }

    #[test]
    fn rejects_unknown_version() {
        let result = Version::from_wire(0xdead_beef);
        assert_eq!(result, Err(ProtocolError::UnsupportedVersion(0xdead_beef)));
    }

    #[test]
    fn salts_differ_between_versions() {
        let v1 = Version::V1.initial_params();
        let draft = Version::Draft29.initial_params();
        assert_ne!(v1.salt, draft.salt, "each version must have its own salt");
    }

    #[test]
    fn labels_are_shared_by_shipped_versions() {
        let v1 = Version::V1.initial_params();
        let draft = Version::Draft29.initial_params();
        assert_eq!(v1.key_label, draft.key_label);
        assert_eq!(v1.iv_label, draft.iv_label);
        assert_eq!(v1.hp_label, draft.hp_label);
    }
}
