//! # Packet Headers (RFC 9000 Section 17)
//!
//! Byte-exact models of the long and short header formats. A header is a
//! tagged variant, not a class hierarchy: one parse entry point dispatches on
//! the first-byte form bit and returns the matching shape.
//!
//! Long header layout:
//!
//! ```text
//! byte 0:     1|1|T T|R R|P P     (T = type, R = reserved, P = pn-len - 1)
//! bytes 1..5: version (u32 BE)
//! byte 5:     DCID length, then DCID
//! next:       SCID length, then SCID
//! Initial:    token length (varint), token
//! Initial/0-RTT/Handshake: length (varint), packet number (1-4 bytes)
//! Retry:      original DCID length (u8), original DCID, retry token
//! ```
//!
//! Short header layout:
//!
//! ```text
//! byte 0:     0|1|S|R R|K|P P     (S = spin, K = key phase, P = pn-len - 1)
//! bytes 1..:  DCID (length known from connection context, not on wire)
//! packet number (1-4 bytes), payload
//! ```
//!
//! Parsing assumes header protection has already been removed; the factory
//! uses the raw-byte queries below to locate the packet number field first.

#![forbid(unsafe_code)]

use bytes::{Buf, BufMut, Bytes};

use crate::crypto::KeyPhase;
use crate::error::{Error, Result};
use crate::packet::number::{decode_packet_number, encode_packet_number};
use crate::packet::types::PacketType;
use crate::types::{
    read_bytes, read_u32, read_u8, read_varint, ConnectionId, PacketNumber, VarIntCodec,
    MAX_CID_LENGTH,
};
use crate::version::{Version, VERSION_NEGOTIATION};

/// Header form bit: set for long headers.
pub const FORM_BIT: u8 = 0x80;

/// Fixed bit: set in every QUIC packet except Version Negotiation.
pub const FIXED_BIT: u8 = 0x40;

/// Reserved bits in a long-header first byte; zero on the wire under
/// header protection.
pub const LONG_RESERVED_BITS: u8 = 0x0c;

/// Reserved bits in a short-header first byte.
pub const SHORT_RESERVED_BITS: u8 = 0x18;

const KEY_PHASE_BIT: u8 = 0x04;
const PN_LEN_MASK: u8 = 0x03;
const LONG_TYPE_MASK: u8 = 0x30;

/// Long header for Initial, 0-RTT, and Handshake packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongHeader {
    /// One of `Initial`, `ZeroRtt`, `Handshake`.
    pub packet_type: PacketType,
    pub version: Version,
    pub dcid: ConnectionId,
    pub scid: ConnectionId,
    /// Address validation token; only serialized for Initial packets and
    /// empty everywhere else.
    pub token: Bytes,
    /// Length field: packet number plus payload plus AEAD tag.
    pub length: u64,
    pub packet_number: PacketNumber,
    pub packet_number_len: u8,
}

/// Short (1-RTT) header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortHeader {
    pub dcid: ConnectionId,
    pub key_phase: KeyPhase,
    pub packet_number: PacketNumber,
    pub packet_number_len: u8,
}

/// Retry header; carries no packet number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryHeader {
    pub version: Version,
    pub dcid: ConnectionId,
    pub scid: ConnectionId,
    pub original_dcid: ConnectionId,
    pub retry_token: Bytes,
}

/// Version Negotiation header (version field zero); the trailer lists the
/// sender's supported versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionNegotiationHeader {
    pub dcid: ConnectionId,
    pub scid: ConnectionId,
    pub supported_versions: Vec<Version>,
}

/// Parsed or to-be-serialized packet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Long(LongHeader),
    Short(ShortHeader),
    Retry(RetryHeader),
    VersionNegotiation(VersionNegotiationHeader),
}

impl Header {
    /// Parse an unprotected header from the front of `packet`.
    ///
    /// `dcid_len` is the connection-context CID length used for short
    /// headers (it is not encoded on the wire). `largest_acked` anchors
    /// packet number reconstruction.
    pub fn parse(packet: &[u8], dcid_len: usize, largest_acked: PacketNumber) -> Result<Self> {
        let mut buf = packet;
        let first = read_u8(&mut buf)?;

        if first & FORM_BIT != 0 {
            Self::parse_long(first, &mut buf, largest_acked)
        } else {
            Self::parse_short(first, &mut buf, dcid_len, largest_acked)
        }
    }

    fn parse_long<B: Buf>(first: u8, buf: &mut B, largest_acked: PacketNumber) -> Result<Self> {
        let version = read_u32(buf)?;

        let dcid = Self::read_cid(buf)?;
        let scid = Self::read_cid(buf)?;

        if version == VERSION_NEGOTIATION {
            let mut supported_versions = Vec::new();
            while buf.has_remaining() {
                supported_versions.push(read_u32(buf)?);
            }
            return Ok(Header::VersionNegotiation(VersionNegotiationHeader {
                dcid,
                scid,
                supported_versions,
            }));
        }

        let packet_type = match (first & LONG_TYPE_MASK) >> 4 {
            0x0 => PacketType::Initial,
            0x1 => PacketType::ZeroRtt,
            0x2 => PacketType::Handshake,
            _ => PacketType::Retry,
        };

        if packet_type == PacketType::Retry {
            let odcil = read_u8(buf)? as usize;
            if odcil > MAX_CID_LENGTH {
                return Err(Error::InvalidCidLength(odcil));
            }
            let original_dcid = ConnectionId::new(read_bytes(buf, odcil)?)?;
            let remainder = buf.remaining();
            let retry_token = read_bytes(buf, remainder)?;
            return Ok(Header::Retry(RetryHeader {
                version,
                dcid,
                scid,
                original_dcid,
                retry_token,
            }));
        }

        let token = if packet_type == PacketType::Initial {
            let token_len = read_varint(buf)? as usize;
            read_bytes(buf, token_len)?
        } else {
            Bytes::new()
        };

        let length = read_varint(buf)?;
        let packet_number_len = (first & PN_LEN_MASK) + 1;
        if u64::from(packet_number_len) > length {
            return Err(Error::InvalidPacket);
        }
        let truncated = Self::read_truncated_pn(buf, packet_number_len)?;
        let packet_number = decode_packet_number(truncated, packet_number_len, largest_acked);

        Ok(Header::Long(LongHeader {
            packet_type,
            version,
            dcid,
            scid,
            token,
            length,
            packet_number,
            packet_number_len,
        }))
    }

    fn parse_short<B: Buf>(
        first: u8,
        buf: &mut B,
        dcid_len: usize,
        largest_acked: PacketNumber,
    ) -> Result<Self> {
        if dcid_len > MAX_CID_LENGTH {
            return Err(Error::InvalidCidLength(dcid_len));
        }
        let dcid = ConnectionId::new(read_bytes(buf, dcid_len)?)?;

        let key_phase = KeyPhase::from_bit(first & KEY_PHASE_BIT != 0);
        let packet_number_len = (first & PN_LEN_MASK) + 1;
        let truncated = Self::read_truncated_pn(buf, packet_number_len)?;
        let packet_number = decode_packet_number(truncated, packet_number_len, largest_acked);

        Ok(Header::Short(ShortHeader {
            dcid,
            key_phase,
            packet_number,
            packet_number_len,
        }))
    }

    fn read_cid<B: Buf>(buf: &mut B) -> Result<ConnectionId> {
        let len = read_u8(buf)? as usize;
        if len > MAX_CID_LENGTH {
            return Err(Error::InvalidCidLength(len));
        }
        ConnectionId::new(read_bytes(buf, len)?)
    }

    fn read_truncated_pn<B: Buf>(buf: &mut B, len: u8) -> Result<u64> {
        if buf.remaining() < len as usize {
            return Err(Error::BufferTooShort);
        }
        Ok(buf.get_uint(len as usize))
    }

    /// Serialize the header, returning bytes written.
    ///
    /// Reserved bits are written as zero; the factory overwrites the first
    /// byte and packet number bytes when it applies header protection.
    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> Result<usize> {
        match self {
            Header::Long(h) => h.serialize(buf),
            Header::Short(h) => h.serialize(buf),
            Header::Retry(h) => h.serialize(buf),
            Header::VersionNegotiation(h) => h.serialize(buf),
        }
    }

    /// The packet type this header belongs to.
    pub fn packet_type(&self) -> PacketType {
        match self {
            Header::Long(h) => h.packet_type,
            Header::Short(_) => PacketType::OneRtt,
            Header::Retry(_) => PacketType::Retry,
            Header::VersionNegotiation(_) => PacketType::VersionNegotiation,
        }
    }

    pub fn destination_cid(&self) -> &ConnectionId {
        match self {
            Header::Long(h) => &h.dcid,
            Header::Short(h) => &h.dcid,
            Header::Retry(h) => &h.dcid,
            Header::VersionNegotiation(h) => &h.dcid,
        }
    }

    /// Source CID; the zero sentinel for short headers, which carry none.
    pub fn source_cid(&self) -> ConnectionId {
        match self {
            Header::Long(h) => h.scid.clone(),
            Header::Short(_) => ConnectionId::zero(),
            Header::Retry(h) => h.scid.clone(),
            Header::VersionNegotiation(h) => h.scid.clone(),
        }
    }

    pub fn packet_number(&self) -> Option<PacketNumber> {
        match self {
            Header::Long(h) => Some(h.packet_number),
            Header::Short(h) => Some(h.packet_number),
            Header::Retry(_) | Header::VersionNegotiation(_) => None,
        }
    }

    pub fn version(&self) -> Option<Version> {
        match self {
            Header::Long(h) => Some(h.version),
            Header::Retry(h) => Some(h.version),
            Header::VersionNegotiation(_) => Some(VERSION_NEGOTIATION),
            Header::Short(_) => None,
        }
    }

    pub fn key_phase(&self) -> KeyPhase {
        match self {
            Header::Short(h) => h.key_phase,
            _ => KeyPhase::Initial,
        }
    }

    /// Header size in bytes including the packet number field.
    pub fn size(&self) -> usize {
        match self {
            Header::Long(h) => h.payload_offset(),
            Header::Short(h) => h.payload_offset(),
            Header::Retry(h) => h.size(),
            Header::VersionNegotiation(h) => h.size(),
        }
    }
}

impl LongHeader {
    /// Byte offset of the token field (Initial packets).
    pub fn token_offset(&self) -> usize {
        // first byte + version + DCIL + DCID + SCIL + SCID
        7 + self.dcid.len() + self.scid.len()
    }

    /// Byte offset of the packet number field.
    pub fn pn_offset(&self) -> usize {
        let mut offset = self.token_offset();
        if self.packet_type == PacketType::Initial {
            offset += VarIntCodec::size(self.token.len() as u64) + self.token.len();
        }
        offset + VarIntCodec::size(self.length)
    }

    /// Byte offset of the payload (first byte after the packet number).
    pub fn payload_offset(&self) -> usize {
        self.pn_offset() + self.packet_number_len as usize
    }

    fn type_bits(&self) -> u8 {
        match self.packet_type {
            PacketType::Initial => 0x00,
            PacketType::ZeroRtt => 0x10,
            PacketType::Handshake => 0x20,
            _ => 0x30,
        }
    }

    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> Result<usize> {
        let first = FORM_BIT | FIXED_BIT | self.type_bits() | (self.packet_number_len - 1);
        buf.put_u8(first);
        buf.put_u32(self.version);
        buf.put_u8(self.dcid.len() as u8);
        buf.put_slice(self.dcid.as_bytes());
        buf.put_u8(self.scid.len() as u8);
        buf.put_slice(self.scid.as_bytes());
        if self.packet_type == PacketType::Initial {
            VarIntCodec::encode(self.token.len() as u64, buf)?;
            buf.put_slice(&self.token);
        }
        VarIntCodec::encode(self.length, buf)?;
        let truncated = encode_packet_number(self.packet_number, self.packet_number_len);
        buf.put_uint(truncated, self.packet_number_len as usize);
        Ok(self.payload_offset())
    }

    // ------------------------------------------------------------------
    // Raw-byte queries
    //
    // These operate on protected packets, touching only fields outside
    // header protection, so the factory can locate the packet number
    // before any cryptography runs.
    // ------------------------------------------------------------------

    /// Long-header type bits from the first byte.
    pub fn packet_type_of(packet: &[u8]) -> Result<PacketType> {
        let &first = packet.first().ok_or(Error::BufferTooShort)?;
        if first & FORM_BIT == 0 {
            return Err(Error::InvalidPacket);
        }
        Ok(match (first & LONG_TYPE_MASK) >> 4 {
            0x0 => PacketType::Initial,
            0x1 => PacketType::ZeroRtt,
            0x2 => PacketType::Handshake,
            _ => PacketType::Retry,
        })
    }

    /// Version field of a long-header packet.
    pub fn version_of(packet: &[u8]) -> Result<Version> {
        if packet.len() < 5 {
            return Err(Error::BufferTooShort);
        }
        Ok(u32::from_be_bytes([packet[1], packet[2], packet[3], packet[4]]))
    }

    /// Actual destination CID length in bytes.
    pub fn dcil(packet: &[u8]) -> Result<u8> {
        packet.get(5).copied().ok_or(Error::BufferTooShort)
    }

    /// Actual source CID length in bytes.
    pub fn scil(packet: &[u8]) -> Result<u8> {
        let dcil = Self::dcil(packet)? as usize;
        packet.get(6 + dcil).copied().ok_or(Error::BufferTooShort)
    }

    fn token_length_offset(packet: &[u8]) -> Result<usize> {
        let dcil = Self::dcil(packet)? as usize;
        let scil = Self::scil(packet)? as usize;
        Ok(7 + dcil + scil)
    }

    /// Token length field of an Initial packet: `(value, field_width)`.
    pub fn token_length(packet: &[u8]) -> Result<(u64, usize)> {
        let offset = Self::token_length_offset(packet)?;
        if offset >= packet.len() {
            return Err(Error::BufferTooShort);
        }
        VarIntCodec::decode(&packet[offset..])
    }

    /// Length field (packet number + payload + tag): `(value, field_width)`.
    pub fn length(packet: &[u8]) -> Result<(u64, usize)> {
        let mut offset = Self::token_length_offset(packet)?;
        if Self::packet_type_of(packet)? == PacketType::Initial {
            let (token_len, width) = Self::token_length(packet)?;
            offset += width + token_len as usize;
        }
        if offset >= packet.len() {
            return Err(Error::BufferTooShort);
        }
        VarIntCodec::decode(&packet[offset..])
    }

    /// Byte offset of the (still protected) packet number field.
    pub fn packet_number_offset(packet: &[u8]) -> Result<usize> {
        let mut offset = Self::token_length_offset(packet)?;
        if Self::packet_type_of(packet)? == PacketType::Initial {
            let (token_len, width) = Self::token_length(packet)?;
            offset += width + token_len as usize;
        }
        let (_, length_width) = Self::length(packet)?;
        offset += length_width;
        if offset >= packet.len() {
            return Err(Error::BufferTooShort);
        }
        Ok(offset)
    }
}

impl ShortHeader {
    /// Byte offset of the packet number field.
    pub fn pn_offset(&self) -> usize {
        1 + self.dcid.len()
    }

    /// Byte offset of the payload.
    pub fn payload_offset(&self) -> usize {
        self.pn_offset() + self.packet_number_len as usize
    }

    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> Result<usize> {
        let mut first = FIXED_BIT | (self.packet_number_len - 1);
        if self.key_phase.to_bit() {
            first |= KEY_PHASE_BIT;
        }
        buf.put_u8(first);
        buf.put_slice(self.dcid.as_bytes());
        let truncated = encode_packet_number(self.packet_number, self.packet_number_len);
        buf.put_uint(truncated, self.packet_number_len as usize);
        Ok(self.payload_offset())
    }

    /// Key phase bit of a short-header first byte. Only meaningful once
    /// header protection has been removed.
    pub fn key_phase_of(packet: &[u8]) -> Result<KeyPhase> {
        let &first = packet.first().ok_or(Error::BufferTooShort)?;
        if first & FORM_BIT != 0 {
            return Err(Error::InvalidPacket);
        }
        Ok(KeyPhase::from_bit(first & KEY_PHASE_BIT != 0))
    }

    /// Byte offset of the packet number, given the connection-context CID
    /// length.
    pub fn packet_number_offset(packet: &[u8], dcid_len: usize) -> Result<usize> {
        let offset = 1 + dcid_len;
        if offset >= packet.len() {
            return Err(Error::BufferTooShort);
        }
        Ok(offset)
    }
}

impl RetryHeader {
    pub fn size(&self) -> usize {
        7 + self.dcid.len() + self.scid.len() + 1 + self.original_dcid.len()
            + self.retry_token.len()
    }

    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> Result<usize> {
        buf.put_u8(FORM_BIT | FIXED_BIT | 0x30);
        buf.put_u32(self.version);
        buf.put_u8(self.dcid.len() as u8);
        buf.put_slice(self.dcid.as_bytes());
        buf.put_u8(self.scid.len() as u8);
        buf.put_slice(self.scid.as_bytes());
        buf.put_u8(self.original_dcid.len() as u8);
        buf.put_slice(self.original_dcid.as_bytes());
        buf.put_slice(&self.retry_token);
        Ok(self.size())
    }
}

impl VersionNegotiationHeader {
    pub fn size(&self) -> usize {
        7 + self.dcid.len() + self.scid.len() + 4 * self.supported_versions.len()
    }

    pub fn serialize<B: BufMut>(&self, buf: &mut B) -> Result<usize> {
        buf.put_u8(FORM_BIT | FIXED_BIT);
        buf.put_u32(VERSION_NEGOTIATION);
        buf.put_u8(self.dcid.len() as u8);
        buf.put_slice(self.dcid.as_bytes());
        buf.put_u8(self.scid.len() as u8);
        buf.put_slice(self.scid.as_bytes());
        for version in &self.supported_versions {
            buf.put_u32(*version);
        }
        Ok(self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VERSION_1;
    use bytes::BytesMut;

    fn cid(bytes: &[u8]) -> ConnectionId {
        ConnectionId::from_slice(bytes).unwrap()
    }

    fn long_header(packet_type: PacketType, token: &'static [u8]) -> LongHeader {
        LongHeader {
            packet_type,
            version: VERSION_1,
            dcid: cid(&[0x11; 8]),
            scid: cid(&[0x22; 8]),
            token: Bytes::from_static(token),
            length: 0x14,
            packet_number: 0x1234,
            packet_number_len: 2,
        }
    }

    #[test]
    fn test_initial_header_roundtrip() {
        let header = Header::Long(long_header(PacketType::Initial, &[0xab, 0xcd]));
        let mut buf = BytesMut::new();
        let written = header.serialize(&mut buf).unwrap();
        assert_eq!(written, buf.len());

        let parsed = Header::parse(&buf, 0, 0x1233).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_handshake_header_roundtrip() {
        let header = Header::Long(long_header(PacketType::Handshake, &[]));
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();
        let parsed = Header::parse(&buf, 0, 0x1233).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_zero_rtt_header_roundtrip() {
        let header = Header::Long(long_header(PacketType::ZeroRtt, &[]));
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();
        assert_eq!(Header::parse(&buf, 0, 0x1233).unwrap(), header);
    }

    #[test]
    fn test_initial_first_byte_layout() {
        let header = Header::Long(long_header(PacketType::Initial, &[]));
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();
        // form + fixed bits, type 0, reserved 0, pn-len bits = 1 (2 bytes)
        assert_eq!(buf[0], 0xc1);
        assert_eq!(&buf[1..5], &[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(buf[5], 8); // DCIL
    }

    #[test]
    fn test_short_header_roundtrip_with_key_phase() {
        let header = Header::Short(ShortHeader {
            dcid: cid(&[0xca, 0xfe, 0xba, 0xbe]),
            key_phase: KeyPhase::Phase1,
            packet_number: 0x12345678,
            packet_number_len: 4,
        });
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();
        // fixed bit + key phase + pn-len bits = 3
        assert_eq!(buf[0], 0x47);
        let parsed = Header::parse(&buf, 4, 0x12345677).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_version_negotiation_layout() {
        let header = Header::VersionNegotiation(VersionNegotiationHeader {
            dcid: cid(&[0x11; 8]),
            scid: cid(&[0x22; 8]),
            supported_versions: vec![VERSION_1, 0xff00_0017],
        });
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();

        assert_ne!(buf[0] & FORM_BIT, 0);
        assert_eq!(&buf[1..5], &[0, 0, 0, 0]);
        let trailer = &buf[buf.len() - 8..];
        assert_eq!(trailer, &[0x00, 0x00, 0x00, 0x01, 0xff, 0x00, 0x00, 0x17]);

        assert_eq!(Header::parse(&buf, 0, 0).unwrap(), header);
    }

    #[test]
    fn test_retry_header_roundtrip() {
        let header = Header::Retry(RetryHeader {
            version: VERSION_1,
            dcid: cid(&[0x11; 8]),
            scid: cid(&[0x22; 8]),
            original_dcid: cid(&[0x33; 8]),
            retry_token: Bytes::from_static(b"retry-token"),
        });
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();
        assert_eq!(Header::parse(&buf, 0, 0).unwrap(), header);
    }

    #[test]
    fn test_retry_truncated_fails() {
        let header = Header::Retry(RetryHeader {
            version: VERSION_1,
            dcid: cid(&[0x11; 8]),
            scid: cid(&[0x22; 8]),
            original_dcid: cid(&[0x33; 8]),
            retry_token: Bytes::from_static(b"token"),
        });
        let mut buf = BytesMut::new();
        header.serialize(&mut buf).unwrap();
        // Cut mid-CID.
        let truncated = &buf[..20];
        assert!(Header::parse(truncated, 0, 0).is_err());
    }

    #[test]
    fn test_parse_rejects_oversized_cid() {
        // DCIL of 21 exceeds the protocol maximum.
        let packet = [0xc1, 0x00, 0x00, 0x00, 0x01, 21];
        assert_eq!(
            Header::parse(&packet, 0, 0),
            Err(Error::InvalidCidLength(21))
        );
    }

    #[test]
    fn test_static_queries_on_initial() {
        let header = long_header(PacketType::Initial, &[0xab, 0xcd]);
        let wrapped = Header::Long(header.clone());
        let mut buf = BytesMut::new();
        wrapped.serialize(&mut buf).unwrap();

        assert_eq!(LongHeader::packet_type_of(&buf).unwrap(), PacketType::Initial);
        assert_eq!(LongHeader::version_of(&buf).unwrap(), VERSION_1);
        assert_eq!(LongHeader::dcil(&buf).unwrap(), 8);
        assert_eq!(LongHeader::scil(&buf).unwrap(), 8);
        assert_eq!(LongHeader::token_length(&buf).unwrap(), (2, 1));
        assert_eq!(LongHeader::length(&buf).unwrap(), (0x14, 1));
        assert_eq!(
            LongHeader::packet_number_offset(&buf).unwrap(),
            header.pn_offset()
        );
    }

    #[test]
    fn test_static_queries_truncated_input() {
        assert_eq!(LongHeader::version_of(&[0xc1, 0, 0]), Err(Error::BufferTooShort));
        assert_eq!(LongHeader::dcil(&[0xc1, 0, 0, 0, 1]), Err(Error::BufferTooShort));
        // Header cut off inside the token length varint.
        let packet = [0xc1, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00];
        assert_eq!(LongHeader::token_length(&packet), Err(Error::BufferTooShort));
    }

    #[test]
    fn test_short_header_static_queries() {
        let packet = [0x47, 0xca, 0xfe, 0xba, 0xbe, 0x12, 0x34, 0x56, 0x78, 0x00];
        assert_eq!(ShortHeader::key_phase_of(&packet).unwrap(), KeyPhase::Phase1);
        assert_eq!(ShortHeader::packet_number_offset(&packet, 4).unwrap(), 5);
        assert_eq!(
            ShortHeader::packet_number_offset(&packet[..4], 4),
            Err(Error::BufferTooShort)
        );
    }

    #[test]
    fn test_header_accessors() {
        let header = Header::Long(long_header(PacketType::Initial, &[]));
        assert_eq!(header.packet_type(), PacketType::Initial);
        assert_eq!(header.packet_number(), Some(0x1234));
        assert_eq!(header.version(), Some(VERSION_1));
        assert_eq!(header.key_phase(), KeyPhase::Initial);
        assert_eq!(header.destination_cid(), &cid(&[0x11; 8]));
        assert_eq!(header.source_cid(), cid(&[0x22; 8]));
    }
}
