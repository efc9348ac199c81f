//! Directional secret derivation for Initial packets

use hkdf::Hkdf;
use quell_proto::{ConnectionId, Version};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::initial::error::CryptoError;

/// Directional secret length in bytes (one SHA-256 output)
pub const SECRET_LEN: usize = 32;

/// Derivation label for packets the client sends
const CLIENT_LABEL: &[u8] = b"client in";

/// Derivation label for packets the server sends
const SERVER_LABEL: &[u8] = b"server in";

/// Secret for one direction of Initial traffic.
///
/// Wraps the raw bytes so the secret is zeroized on drop and cannot be
/// cloned around accidentally. Packet protection keys derive from it
/// via [`crate::KeyMaterial::derive`].
pub struct DirectionalSecret {
    bytes: [u8; SECRET_LEN],
}

impl DirectionalSecret {
    /// Raw secret bytes, used as the HKDF PRK for the key schedule
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.bytes
    }
}

impl Drop for DirectionalSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// HKDF-Expand-Label from TLS 1.3, with an empty context.
///
/// The info parameter is the length-prefixed label structure: output
/// length (u16) || label length (u8) || "tls13 " || label || context
/// length (0). Getting this byte layout wrong produces keys that fail
/// against every conforming peer, which is why the known-answer tests
/// pin the full derivation chain.
pub(crate) fn hkdf_expand_label(hkdf: &Hkdf<Sha256>, label: &[u8], out: &mut [u8]) {
    // Capacity: 2 (out len) + 1 (label len) + 6 ("tls13 ") + label + 1 (empty context)
    let mut info = Vec::with_capacity(10 + label.len());
    info.extend_from_slice(&(out.len() as u16).to_be_bytes());
    info.push((6 + label.len()) as u8);
    info.extend_from_slice(b"tls13 ");
    info.extend_from_slice(label);
    info.push(0);

    let Ok(()) = hkdf.expand(&info, out) else {
        unreachable!("derived key lengths are valid HKDF-SHA256 output lengths");
    };
}

/// Derive the client and server Initial secrets for a connection.
///
/// Both endpoints call this with the destination connection ID from the
/// client's first packet, so both compute identical secrets. Returned
/// order is (client, server).
///
/// # Security
///
/// - The version's salt separates keys across protocol versions
/// - Different connection IDs produce unrelated secrets
/// - Deterministic: same version and connection ID always produce the
///   same secrets
///
/// # Errors
///
/// - `CryptoError::EmptyConnectionId` if `dcid` is empty
pub fn derive_directional_secrets(
    version: Version,
    dcid: &ConnectionId,
) -> Result<(DirectionalSecret, DirectionalSecret), CryptoError> {
    if dcid.is_empty() {
        return Err(CryptoError::EmptyConnectionId);
    }

    let params = version.initial_params();
    let (_, hkdf) = Hkdf::<Sha256>::extract(Some(params.salt.as_slice()), dcid.as_ref());

    let mut client = [0u8; SECRET_LEN];
    hkdf_expand_label(&hkdf, CLIENT_LABEL, &mut client);
    let mut server = [0u8; SECRET_LEN];
    hkdf_expand_label(&hkdf, SERVER_LABEL, &mut server);

    Ok((DirectionalSecret { bytes: client }, DirectionalSecret { bytes: server }))
}
