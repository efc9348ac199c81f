//! Fuzz target for Initial packet protection round-trips
//!
//! Seals packets with real derived keys and checks the opener on both
//! pristine and tampered copies.
//!
//! # Strategy
//!
//! - Arbitrary versions, sides, connection IDs, packet numbers, payloads
//! - Packet number widths chosen from the encoded distance, as a real
//!   endpoint would
//! - Optional single-byte tamper at an arbitrary offset
//!
//! # Invariants
//!
//! - Sealing with a well-formed header never panics
//! - open(seal(p)) recovers the payload and packet number exactly
//! - A tampered packet is rejected, never opened to altered plaintext

#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use quell_crypto::{TAG_LEN, initial_protection};
use quell_proto::{ConnectionId, InitialHeader, PacketNumber, Side, Version};

#[derive(Debug, Clone, Arbitrary)]
struct RoundtripScenario {
    draft29: bool,
    server_seals: bool,
    /// Destination connection ID bytes (clamped to 1..=20)
    dcid: Vec<u8>,
    /// Packet number (clamped so a fresh opener can expand it)
    pn: u64,
    payload: Vec<u8>,
    /// Byte to flip after sealing, if any
    tamper: Option<(usize, u8)>,
}

fuzz_target!(|scenario: RoundtripScenario| {
    let version = if scenario.draft29 { Version::Draft29 } else { Version::V1 };
    let side = if scenario.server_seals { Side::Server } else { Side::Client };

    let mut dcid_bytes = scenario.dcid;
    dcid_bytes.truncate(20);
    if dcid_bytes.is_empty() {
        dcid_bytes.push(0x01);
    }
    let Ok(dcid) = ConnectionId::new(&dcid_bytes) else {
        return;
    };

    // An opener with no receive history can only expand numbers that
    // sit inside the encoding window around zero
    let Ok(pn) = PacketNumber::new(scenario.pn & 0x3fff_ffff) else {
        return;
    };

    let Ok((sealer, _)) = initial_protection(version, &dcid, side) else {
        return;
    };
    let Ok((_, opener)) = initial_protection(version, &dcid, side.opposite()) else {
        return;
    };

    let pn_len = pn.encoded_len(None);
    let header = InitialHeader {
        version,
        dcid,
        scid: ConnectionId::new(&[]).unwrap(),
        token: Bytes::new(),
        length: (pn_len.bytes() + scenario.payload.len() + TAG_LEN) as u64,
    };
    let Ok(encoded) = header.encode(pn, pn_len) else {
        return;
    };
    let pn_offset = encoded.len() - pn_len.bytes();

    let Ok(mut packet) = sealer.seal_packet(&encoded, pn, &scenario.payload) else {
        // Short payloads can leave no room for the protection sample
        return;
    };

    match scenario.tamper {
        None => {
            let (opened_pn, opened) = opener
                .open_packet(&mut packet, pn_offset, None)
                .unwrap_or_else(|err| panic!("pristine packet rejected: {err}"));
            assert_eq!(opened_pn, pn);
            assert_eq!(opened, scenario.payload);
        }
        Some((index, bit)) => {
            let index = index % packet.len();
            let flip = 1u8 << (bit % 8);
            packet[index] ^= flip;
            let result = opener.open_packet(&mut packet, pn_offset, None);
            assert!(result.is_err(), "tampered byte {index} must be rejected");
        }
    }
});
