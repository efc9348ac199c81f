//! Sealer and opener facades for whole Initial packets
//!
//! The two protection layers compose in a fixed order. Sealing runs the
//! AEAD first, because the cleartext header is its associated data, and
//! masks the header second, because the mask is sampled from the
//! ciphertext the AEAD just produced. Opening reverses this: unmask the
//! header to learn the packet number, then open the payload with the
//! restored header as associated data.
//!
//! [`InitialSealer`] and [`InitialOpener`] hold no mutable state. The
//! opener takes the caller's largest received packet number as an
//! argument instead of tracking one, so a single pair can serve any
//! number of threads.

use quell_proto::{
    ConnectionId, PacketNumber, PacketNumberLen, SAMPLE_LEN, SAMPLE_OFFSET_FROM_PN, Side, Version,
};

use crate::initial::error::CryptoError;
use crate::initial::header_protection::HeaderProtector;
use crate::initial::key_schedule::KeyMaterial;
use crate::initial::packet_cipher::PacketCipher;
use crate::initial::secrets::derive_directional_secrets;

/// Copy the header protection sample out of a sealed packet.
///
/// The sample starts four bytes past the packet number offset, so it
/// clears the longest possible number field and lands in ciphertext for
/// every width.
fn sample_at(packet: &[u8], pn_offset: usize) -> Result<[u8; SAMPLE_LEN], CryptoError> {
    let start = pn_offset + SAMPLE_OFFSET_FROM_PN;
    let end = start + SAMPLE_LEN;
    if packet.len() < end {
        return Err(CryptoError::PacketTooShort { expected: end, actual: packet.len() });
    }

    let mut sample = [0u8; SAMPLE_LEN];
    sample.copy_from_slice(&packet[start..end]);
    Ok(sample)
}

/// Big-endian value of the truncated packet number field.
fn read_pn_field(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |value, &byte| value << 8 | u64::from(byte))
}

/// Seals Initial packets for the local send direction.
pub struct InitialSealer {
    cipher: PacketCipher,
    protector: HeaderProtector,
}

impl InitialSealer {
    /// Build a sealer from the send direction's key material.
    pub fn new(keys: &KeyMaterial) -> Self {
        Self { cipher: PacketCipher::new(keys), protector: HeaderProtector::new(keys.hp()) }
    }

    /// Seal a payload against its cleartext header.
    ///
    /// Lower-level entry for callers staging their own buffers: returns
    /// ciphertext plus tag, leaving header assembly and protection to
    /// the caller. The composed path is [`Self::seal_packet`].
    pub fn seal(&self, pn: PacketNumber, header: &[u8], payload: &[u8]) -> Vec<u8> {
        self.cipher.seal(pn, header, payload)
    }

    /// Mask the first byte and packet number of a fully sealed packet.
    ///
    /// # Errors
    ///
    /// - `CryptoError::PacketTooShort` if the packet ends before a full
    ///   sample past the number field
    pub fn protect_header(
        &self,
        packet: &mut [u8],
        pn_offset: usize,
        pn_len: PacketNumberLen,
    ) -> Result<(), CryptoError> {
        let sample = sample_at(packet, pn_offset)?;
        self.protector.protect(packet, pn_offset, pn_len, &sample)
    }

    /// Seal one packet end to end: AEAD the payload, assemble, mask the
    /// header.
    ///
    /// `header` is the complete unprotected header ending in the
    /// truncated packet number; its final bytes must encode `pn` at the
    /// width announced by the first byte's low bits.
    ///
    /// # Errors
    ///
    /// - `CryptoError::PacketTooShort` if `header` cannot hold its own
    ///   packet number field, or the sealed packet ends before a full
    ///   protection sample
    /// - `CryptoError::PacketNumberMismatch` if the header's number
    ///   bytes disagree with `pn`
    pub fn seal_packet(
        &self,
        header: &[u8],
        pn: PacketNumber,
        payload: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if header.is_empty() {
            return Err(CryptoError::PacketTooShort { expected: 1, actual: 0 });
        }
        let pn_len = PacketNumberLen::from_first_byte(header[0]);
        if header.len() < 1 + pn_len.bytes() {
            return Err(CryptoError::PacketTooShort {
                expected: 1 + pn_len.bytes(),
                actual: header.len(),
            });
        }
        let pn_offset = header.len() - pn_len.bytes();

        let encoded = read_pn_field(&header[pn_offset..]);
        let sealing = pn.truncated(pn_len);
        if encoded != sealing {
            return Err(CryptoError::PacketNumberMismatch { header: encoded, sealing });
        }

        let ciphertext = self.cipher.seal(pn, header, payload);

        let mut packet = Vec::with_capacity(header.len() + ciphertext.len());
        packet.extend_from_slice(header);
        packet.extend_from_slice(&ciphertext);

        self.protect_header(&mut packet, pn_offset, pn_len)?;
        Ok(packet)
    }
}

/// Opens Initial packets from the peer's send direction.
pub struct InitialOpener {
    cipher: PacketCipher,
    protector: HeaderProtector,
}

impl InitialOpener {
    /// Build an opener from the receive direction's key material.
    pub fn new(keys: &KeyMaterial) -> Self {
        Self { cipher: PacketCipher::new(keys), protector: HeaderProtector::new(keys.hp()) }
    }

    /// Unmask a received packet in place, returning the packet number
    /// length read from the restored first byte.
    ///
    /// # Errors
    ///
    /// - `CryptoError::PacketTooShort` if the packet ends before a full
    ///   sample past the number field
    pub fn unprotect_header(
        &self,
        packet: &mut [u8],
        pn_offset: usize,
    ) -> Result<PacketNumberLen, CryptoError> {
        let sample = sample_at(packet, pn_offset)?;
        self.protector.unprotect(packet, pn_offset, &sample)
    }

    /// Open a payload against its restored cleartext header.
    ///
    /// Lower-level entry pairing with [`InitialSealer::seal`]. The
    /// composed path is [`Self::open_packet`].
    ///
    /// # Errors
    ///
    /// - `CryptoError::AuthenticationFailed` if the tag does not verify
    pub fn open(
        &self,
        pn: PacketNumber,
        header: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        self.cipher.open(pn, header, ciphertext)
    }

    /// Open one packet end to end: unmask the header, expand the packet
    /// number, open the payload.
    ///
    /// `packet` is the full received datagram contents for this packet
    /// and is unmasked in place; on success its header bytes hold the
    /// unprotected header. `largest` is the highest packet number
    /// already received in this space, or `None` before any.
    ///
    /// Every error this method returns satisfies
    /// [`CryptoError::is_rejection`]: discard the packet and move on.
    ///
    /// # Errors
    ///
    /// - `CryptoError::PacketTooShort` if the packet ends before a full
    ///   protection sample
    /// - `CryptoError::AuthenticationFailed` if the tag does not
    ///   verify, including when masking was stripped with wrong keys
    pub fn open_packet(
        &self,
        packet: &mut [u8],
        pn_offset: usize,
        largest: Option<PacketNumber>,
    ) -> Result<(PacketNumber, Vec<u8>), CryptoError> {
        let pn_len = self.unprotect_header(packet, pn_offset)?;
        let pn_end = pn_offset + pn_len.bytes();

        let truncated = read_pn_field(&packet[pn_offset..pn_end]);
        let pn = PacketNumber::expand(truncated, pn_len, largest);

        let (header, ciphertext) = packet.split_at(pn_end);
        let plaintext = self.cipher.open(pn, header, ciphertext)?;
        Ok((pn, plaintext))
    }
}

/// Derive the sealer/opener pair for one side of a new connection.
///
/// `dcid` is the destination connection ID from the client's first
/// packet. The client seals with the client secret and opens with the
/// server secret; the server gets the mirror image, so each side's
/// sealer matches the other's opener.
///
/// # Errors
///
/// - `CryptoError::EmptyConnectionId` if `dcid` is empty
pub fn initial_protection(
    version: Version,
    dcid: &ConnectionId,
    side: Side,
) -> Result<(InitialSealer, InitialOpener), CryptoError> {
    let (client, server) = derive_directional_secrets(version, dcid)?;
    let (local, remote) = match side {
        Side::Client => (client, server),
        Side::Server => (server, client),
    };

    let seal_keys = KeyMaterial::derive(&local, version);
    let open_keys = KeyMaterial::derive(&remote, version);

    tracing::debug!(
        ?side,
        ?version,
        dcid_len = dcid.len(),
        "derived initial packet protection keys"
    );

    Ok((InitialSealer::new(&seal_keys), InitialOpener::new(&open_keys)))
}
