//! Header protection: masking the packet number field
//!
//! The AEAD leaves the header in cleartext, so the packet number and
//! the low bits of the first byte get a second, lighter layer: a 5-byte
//! mask derived by encrypting a 16-byte sample of the ciphertext with
//! AES-128. Because the sample sits past the longest possible packet
//! number field, both endpoints find it at the same offset without
//! knowing the number's width.

use aes::{Aes128, Block};
use aes::cipher::{BlockEncrypt, KeyInit};
use quell_proto::{PROTECTED_BITS_LONG, PacketNumberLen, SAMPLE_LEN};

use crate::initial::error::CryptoError;
use crate::initial::key_schedule::HP_KEY_LEN;

/// Mask length in bytes: one byte for the header flags, up to four for
/// the packet number.
pub const MASK_LEN: usize = 5;

/// Applies and removes header protection masks for one direction.
pub struct HeaderProtector {
    cipher: Aes128,
}

impl HeaderProtector {
    /// Build a protector from the direction's header protection key.
    pub fn new(hp_key: &[u8; HP_KEY_LEN]) -> Self {
        Self { cipher: Aes128::new(hp_key.into()) }
    }

    /// Compute the 5-byte mask for one packet's ciphertext sample.
    ///
    /// - `mask[0]` is XORed into the low four bits of the first byte
    /// - `mask[1..5]` are XORed into the packet number bytes
    pub fn mask(&self, sample: &[u8; SAMPLE_LEN]) -> [u8; MASK_LEN] {
        let mut block = Block::from(*sample);
        self.cipher.encrypt_block(&mut block);

        let mut mask = [0u8; MASK_LEN];
        mask.copy_from_slice(&block[..MASK_LEN]);
        mask
    }

    /// Mask the first byte and packet number of a sealed packet.
    ///
    /// `packet` must hold the full sealed packet, with the number at
    /// `pn_offset` spanning `pn_len` bytes.
    ///
    /// # Errors
    ///
    /// - `CryptoError::PacketTooShort` if `packet` ends before the
    ///   number field; nothing is masked on failure
    pub fn protect(
        &self,
        packet: &mut [u8],
        pn_offset: usize,
        pn_len: PacketNumberLen,
        sample: &[u8; SAMPLE_LEN],
    ) -> Result<(), CryptoError> {
        let pn_end = pn_offset + pn_len.bytes();
        if packet.len() < pn_end {
            return Err(CryptoError::PacketTooShort { expected: pn_end, actual: packet.len() });
        }
        let mask = self.mask(sample);

        packet[0] ^= mask[0] & PROTECTED_BITS_LONG;
        let pn_bytes = &mut packet[pn_offset..pn_end];
        for (byte, mask_byte) in pn_bytes.iter_mut().zip(&mask[1..]) {
            *byte ^= mask_byte;
        }
        Ok(())
    }

    /// Unmask a received packet in place, returning the packet number
    /// length learned from the unmasked first byte.
    ///
    /// The first byte must be unmasked before the number field: its low
    /// two bits say how many number bytes the mask covers. Unmasking
    /// more or fewer bytes corrupts the packet.
    ///
    /// # Errors
    ///
    /// - `CryptoError::PacketTooShort` if `packet` ends before the
    ///   number field the unmasked first byte announces; nothing is
    ///   unmasked on failure
    pub fn unprotect(
        &self,
        packet: &mut [u8],
        pn_offset: usize,
        sample: &[u8; SAMPLE_LEN],
    ) -> Result<PacketNumberLen, CryptoError> {
        let mask = self.mask(sample);

        let Some(&masked_first) = packet.first() else {
            return Err(CryptoError::PacketTooShort { expected: 1, actual: 0 });
        };
        let first = masked_first ^ (mask[0] & PROTECTED_BITS_LONG);
        let pn_len = PacketNumberLen::from_first_byte(first);

        let pn_end = pn_offset + pn_len.bytes();
        if packet.len() < pn_end {
            return Err(CryptoError::PacketTooShort { expected: pn_end, actual: packet.len() });
        }

        packet[0] = first;
        let pn_bytes = &mut packet[pn_offset..pn_end];
        for (byte, mask_byte) in pn_bytes.iter_mut().zip(&mask[1..]) {
            *byte ^= mask_byte;
        }

        Ok(pn_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HP_KEY: [u8; HP_KEY_LEN] = [0x42; HP_KEY_LEN];
    const SAMPLE: [u8; SAMPLE_LEN] = [
        0xd1, 0xb1, 0xc9, 0x8d, 0xd7, 0x68, 0x9f, 0xb8, 0xec, 0x11, 0xd2, 0x42, 0xb1, 0x23, 0xdc,
        0x9b,
    ];

    fn packet_with_pn_len(pn_len: PacketNumberLen) -> (Vec<u8>, usize) {
        let mut packet = vec![0xc0 | pn_len.first_byte_bits()];
        packet.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00]); // version, empty cids
        let pn_offset = packet.len();
        packet.extend_from_slice(&[0xa0, 0xa1, 0xa2, 0xa3][..pn_len.bytes()]);
        packet.extend_from_slice(&[0x55; 24]); // stand-in ciphertext
        (packet, pn_offset)
    }

    #[test]
    fn mask_is_deterministic() {
        let protector = HeaderProtector::new(&HP_KEY);
        assert_eq!(protector.mask(&SAMPLE), protector.mask(&SAMPLE));
    }

    #[test]
    fn different_samples_produce_different_masks() {
        let protector = HeaderProtector::new(&HP_KEY);
        let mut other = SAMPLE;
        other[0] ^= 0x01;
        assert_ne!(protector.mask(&SAMPLE), protector.mask(&other));
    }

    #[test]
    fn protect_unprotect_roundtrip_at_every_length() {
        let protector = HeaderProtector::new(&HP_KEY);
        for pn_len in [
            PacketNumberLen::One,
            PacketNumberLen::Two,
            PacketNumberLen::Three,
            PacketNumberLen::Four,
        ] {
            let (original, pn_offset) = packet_with_pn_len(pn_len);
            let mut packet = original.clone();

            protector.protect(&mut packet, pn_offset, pn_len, &SAMPLE).unwrap();
            assert_ne!(packet, original, "protection must change the header");

            let recovered_len = protector.unprotect(&mut packet, pn_offset, &SAMPLE).unwrap();
            assert_eq!(recovered_len, pn_len, "length must survive the mask");
            assert_eq!(packet, original, "unprotect must restore the packet");
        }
    }

    #[test]
    fn high_first_byte_bits_stay_cleartext() {
        let protector = HeaderProtector::new(&HP_KEY);
        let (original, pn_offset) = packet_with_pn_len(PacketNumberLen::Four);
        let mut packet = original.clone();

        protector.protect(&mut packet, pn_offset, PacketNumberLen::Four, &SAMPLE).unwrap();

        // Form, fixed, and type bits must stay readable on the wire
        assert_eq!(packet[0] & 0xf0, original[0] & 0xf0);
    }

    #[test]
    fn bytes_past_the_number_field_are_untouched() {
        let protector = HeaderProtector::new(&HP_KEY);
        let (original, pn_offset) = packet_with_pn_len(PacketNumberLen::Two);
        let mut packet = original.clone();

        protector.protect(&mut packet, pn_offset, PacketNumberLen::Two, &SAMPLE).unwrap();

        assert_eq!(&packet[pn_offset + 2..], &original[pn_offset + 2..]);
        assert_eq!(&packet[1..pn_offset], &original[1..pn_offset]);
    }

    #[test]
    fn protect_refuses_a_packet_shorter_than_its_number_field() {
        let protector = HeaderProtector::new(&HP_KEY);
        let mut packet = vec![0xc3, 0x00, 0x00];
        let before = packet.clone();

        let result = protector.protect(&mut packet, 2, PacketNumberLen::Four, &SAMPLE);
        assert_eq!(result, Err(CryptoError::PacketTooShort { expected: 6, actual: 3 }));
        assert_eq!(packet, before, "a refused protect must not touch the packet");
    }

    #[test]
    fn unprotect_refuses_a_packet_shorter_than_its_number_field() {
        let protector = HeaderProtector::new(&HP_KEY);
        let mask = protector.mask(&SAMPLE);
        // Masked first byte unmasks to a 4-byte number announcement
        let mut packet = vec![0xc3 ^ (mask[0] & PROTECTED_BITS_LONG), 0x00, 0x00];
        let before = packet.clone();

        let result = protector.unprotect(&mut packet, 2, &SAMPLE);
        assert_eq!(result, Err(CryptoError::PacketTooShort { expected: 6, actual: 3 }));
        assert_eq!(packet, before, "a refused unprotect must not touch the packet");
    }

    #[test]
    fn unprotect_refuses_an_empty_packet() {
        let protector = HeaderProtector::new(&HP_KEY);
        let result = protector.unprotect(&mut [], 0, &SAMPLE);
        assert_eq!(result, Err(CryptoError::PacketTooShort { expected: 1, actual: 0 }));
    }
}
