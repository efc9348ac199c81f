//! Quell Wire Types
//!
//! Wire-level types and constants shared across the Quell transport:
//! protocol versions and their Initial key-derivation parameters,
//! connection IDs, packet numbers, variable-length integers, and the
//! Initial long-header layout.
//!
//! Parsing a protected packet stops at the packet number field: its
//! bytes and the low four bits of the first byte are header protected
//! on the wire, so recovering them belongs to the crypto layer. This
//! crate deals only in the cleartext parts.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection_id;
pub mod errors;
pub mod initial_header;
pub mod packet_number;
pub mod side;
pub mod varint;
pub mod version;

pub use connection_id::{ConnectionId, MAX_CID_LEN};
pub use errors::{ProtocolError, Result};
pub use initial_header::{
    FIXED_BIT, FORM_BIT, InitialHeader, PROTECTED_BITS_LONG, SAMPLE_LEN, SAMPLE_OFFSET_FROM_PN,
};
pub use packet_number::{PacketNumber, PacketNumberLen};
pub use side::Side;
pub use version::{InitialParams, SALT_LEN, Version};
