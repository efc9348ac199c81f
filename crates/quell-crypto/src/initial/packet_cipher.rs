//! AEAD sealing and opening for Initial payloads

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Nonce};
use quell_proto::PacketNumber;

use crate::initial::error::CryptoError;
use crate::initial::key_schedule::{IV_LEN, KeyMaterial};

/// AEAD authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// AEAD used for Initial packets.
///
/// Initial protection is pinned to AES-128-GCM by every supported
/// version. Negotiated levels swap in their own cipher after the
/// handshake and never flow through this module.
pub type InitialAead = Aes128Gcm;

/// Seals and opens packet payloads for one direction.
///
/// The nonce for each packet is the direction's base IV XORed with the
/// packet number, so one (key, packet number) pair must seal at most
/// one payload.
pub struct PacketCipher {
    aead: InitialAead,
    iv: [u8; IV_LEN],
}

impl PacketCipher {
    /// Build a cipher from one direction's key material.
    pub fn new(keys: &KeyMaterial) -> Self {
        Self { aead: InitialAead::new(keys.key().into()), iv: *keys.iv() }
    }

    /// Nonce for one packet: the number left-padded to 8 bytes, XORed
    /// into the tail of the base IV.
    fn nonce(&self, pn: PacketNumber) -> [u8; IV_LEN] {
        let mut nonce = self.iv;
        let pn_bytes = pn.value().to_be_bytes();
        for (nonce_byte, pn_byte) in nonce[IV_LEN - 8..].iter_mut().zip(&pn_bytes) {
            *nonce_byte ^= pn_byte;
        }
        nonce
    }

    /// Seal a payload, returning the ciphertext with the tag appended.
    ///
    /// `aad` is the packet header exactly as assembled before header
    /// protection. Any later change to those bytes makes the peer's
    /// open fail.
    pub fn seal(&self, pn: PacketNumber, aad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let nonce = self.nonce(pn);
        let payload = Payload { msg: plaintext, aad };
        let Ok(ciphertext) = self.aead.encrypt(Nonce::from_slice(&nonce), payload) else {
            unreachable!("AES-128-GCM encryption does not fail for in-range input sizes");
        };
        ciphertext
    }

    /// Open a sealed payload, returning the plaintext.
    ///
    /// # Errors
    ///
    /// - `CryptoError::AuthenticationFailed` if the tag does not verify,
    ///   whether from corruption, forgery, or mismatched keys
    pub fn open(
        &self,
        pn: PacketNumber,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let nonce = self.nonce(pn);
        self.aead
            .decrypt(Nonce::from_slice(&nonce), Payload { msg: ciphertext, aad })
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}
