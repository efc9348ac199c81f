//! Initial long-header encoding and parsing.
//!
//! The header ends with the packet number field, whose bytes (and the
//! low four bits of the first byte) are header protected on the wire.
//! Parsing therefore stops at the packet number offset: everything up
//! to it is readable while protected, and recovery of the number itself
//! belongs to the crypto layer.
//!
//! Layout: first byte (form, fixed, type, reserved, pn-length bits),
//! 32-bit version, length-prefixed destination and source connection
//! IDs, varint token length and token, varint Length covering the
//! packet number plus protected payload, then the packet number.

use bytes::{Buf, Bytes};

use crate::{
    connection_id::{ConnectionId, MAX_CID_LEN},
    errors::{ProtocolError, Result},
    packet_number::{PacketNumber, PacketNumberLen},
    varint,
    version::Version,
};

/// Form bit: set for long headers.
pub const FORM_BIT: u8 = 0x80;

/// Fixed bit: set in every valid packet.
pub const FIXED_BIT: u8 = 0x40;

/// Long-header bits covered by header protection.
pub const PROTECTED_BITS_LONG: u8 = 0x0f;

/// Header protection sample length in bytes.
pub const SAMPLE_LEN: usize = 16;

/// Distance from the packet number offset to the sample, sized so the
/// sample clears a maximum-length packet number field.
pub const SAMPLE_OFFSET_FROM_PN: usize = 4;

/// Long-header packet type bits for Initial packets (00).
const TYPE_MASK: u8 = 0x30;

/// An Initial packet header, minus the packet number.
///
/// The packet number is supplied separately at encode time because its
/// width is chosen per packet, and it cannot be parsed from the wire
/// until header protection is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialHeader {
    /// Protocol version.
    pub version: Version,
    /// Destination connection ID.
    pub dcid: ConnectionId,
    /// Source connection ID.
    pub scid: ConnectionId,
    /// Retry token, empty in the common case.
    pub token: Bytes,
    /// Value of the wire Length field: packet number bytes plus
    /// protected payload bytes.
    pub length: u64,
}

impl InitialHeader {
    /// Encode the header with `pn` appended at width `pn_len`.
    ///
    /// The pn-length bits land in the first byte and the truncated
    /// number becomes the final header field, so the packet number
    /// offset of the result is its length minus `pn_len` bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::VarintOutOfRange` if the token length or
    ///   `length` exceed the varint range
    pub fn encode(&self, pn: PacketNumber, pn_len: PacketNumberLen) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len(pn_len));

        buf.push(FORM_BIT | FIXED_BIT | pn_len.first_byte_bits());
        buf.extend_from_slice(&self.version.to_wire().to_be_bytes());

        buf.push(self.dcid.len() as u8);
        buf.extend_from_slice(self.dcid.as_ref());
        buf.push(self.scid.len() as u8);
        buf.extend_from_slice(self.scid.as_ref());

        varint::encode(self.token.len() as u64, &mut buf)?;
        buf.extend_from_slice(&self.token);
        varint::encode(self.length, &mut buf)?;

        let pn_bytes = pn.value().to_be_bytes();
        buf.extend_from_slice(&pn_bytes[8 - pn_len.bytes()..]);

        Ok(buf)
    }

    /// Encoded size including a packet number of width `pn_len`.
    #[must_use]
    pub fn encoded_len(&self, pn_len: PacketNumberLen) -> usize {
        1 + 4
            + 1
            + self.dcid.len()
            + 1
            + self.scid.len()
            + varint::size(self.token.len() as u64)
            + self.token.len()
            + varint::size(self.length)
            + pn_len.bytes()
    }

    /// Parse the protected prefix of an Initial packet.
    ///
    /// Returns the header fields readable under header protection and
    /// the packet number offset. The caller hands both to the crypto
    /// layer, which removes protection and reads the number.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnexpectedEnd` if the buffer ends inside a
    ///   field
    /// - `ProtocolError::InvalidFirstByte` if the form or fixed bit is
    ///   missing, or the type bits are not Initial
    /// - `ProtocolError::UnsupportedVersion` for an unknown version
    /// - `ProtocolError::ConnectionIdTooLong` for an oversized ID
    /// - `ProtocolError::PacketTruncated` if fewer bytes follow the
    ///   header than the Length field claims
    pub fn parse(packet: &[u8]) -> Result<(Self, usize)> {
        let mut buf = packet;

        if buf.remaining() < 1 {
            return Err(ProtocolError::UnexpectedEnd);
        }
        let first = buf.get_u8();
        if first & FORM_BIT == 0 || first & FIXED_BIT == 0 || first & TYPE_MASK != 0 {
            return Err(ProtocolError::InvalidFirstByte(first));
        }

        if buf.remaining() < 4 {
            return Err(ProtocolError::UnexpectedEnd);
        }
        let version = Version::from_wire(buf.get_u32())?;

        let dcid = read_connection_id(&mut buf)?;
        let scid = read_connection_id(&mut buf)?;

        let token_len = varint::decode(&mut buf)?;
        let token_len = usize::try_from(token_len).map_err(|_| ProtocolError::UnexpectedEnd)?;
        if buf.remaining() < token_len {
            return Err(ProtocolError::UnexpectedEnd);
        }
        let token = buf.copy_to_bytes(token_len);

        let length = varint::decode(&mut buf)?;
        let pn_offset = packet.len() - buf.remaining();

        let claimed = usize::try_from(length).map_err(|_| ProtocolError::PacketTruncated {
            expected: usize::MAX,
            actual: buf.remaining(),
        })?;
        if buf.remaining() < claimed {
            return Err(ProtocolError::PacketTruncated {
                expected: claimed,
                actual: buf.remaining(),
            });
        }

        Ok((Self { version, dcid, scid, token, length }, pn_offset))
    }
}

fn read_connection_id(buf: &mut &[u8]) -> Result<ConnectionId> {
    if buf.remaining() < 1 {
        return Err(ProtocolError::UnexpectedEnd);
    }
    let len = buf.get_u8() as usize;
    if len > MAX_CID_LEN {
        return Err(ProtocolError::ConnectionIdTooLong { max: MAX_CID_LEN, actual: len });
    }
    if buf.remaining() < len {
        return Err(ProtocolError::UnexpectedEnd);
    }

    let mut bytes = [0u8; MAX_CID_LEN];
    buf.copy_to_slice(&mut bytes[..len]);
    ConnectionId::new(&bytes[..len])
}
