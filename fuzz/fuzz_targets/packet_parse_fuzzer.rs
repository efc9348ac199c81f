//! Fuzz target for Initial header parsing and packet opening
//!
//! Feeds arbitrary bytes through the full receive path: header parse,
//! header unprotection, AEAD open.
//!
//! # Strategy
//!
//! - Raw arbitrary bytes as the incoming datagram
//! - Real keys derived from a fixed connection ID, so unprotection and
//!   the AEAD actually run instead of bailing at construction
//!
//! # Invariants
//!
//! - Parsing never panics; malformed input is a typed error
//! - Opening never panics and never returns plaintext for input that
//!   was not sealed with the matching keys
//! - Every error for network input classifies as a rejection, never as
//!   a caller contract violation

#![no_main]

use libfuzzer_sys::fuzz_target;
use quell_crypto::initial_protection;
use quell_proto::{ConnectionId, InitialHeader, Side, Version};

fuzz_target!(|data: &[u8]| {
    let Ok((_, pn_offset)) = InitialHeader::parse(data) else {
        return;
    };

    let Ok(dcid) = ConnectionId::new(&[0x83, 0x94, 0xc8, 0xf0, 0x3e, 0x51, 0x57, 0x08]) else {
        return;
    };
    let Ok((_, opener)) = initial_protection(Version::V1, &dcid, Side::Server) else {
        return;
    };

    let mut packet = data.to_vec();
    // Arbitrary bytes were not sealed with these keys; opening must
    // reject them without panicking
    match opener.open_packet(&mut packet, pn_offset, None) {
        Ok(_) => panic!("arbitrary bytes must never authenticate"),
        Err(err) => assert!(
            err.is_rejection(),
            "network input must surface as a rejection, got: {err}"
        ),
    }
});
