//! # Packet Types (RFC 9000 Section 17)

#![forbid(unsafe_code)]

use std::net::SocketAddr;

use bytes::Bytes;

use crate::crypto::{EncryptionLevel, KeyPhase};
use crate::packet::header::Header;
use crate::packet::PacketNumberSpace;
use crate::types::{ConnectionId, PacketNumber};
use crate::version::Version;

/// QUIC packet types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Initial,
    ZeroRtt,
    Handshake,
    Retry,
    VersionNegotiation,
    /// Short-header application data packet.
    OneRtt,
    StatelessReset,
    Unknown,
}

impl PacketType {
    /// The encryption level protecting packets of this type, if any.
    pub fn encryption_level(self) -> Option<EncryptionLevel> {
        match self {
            PacketType::Initial => Some(EncryptionLevel::Initial),
            PacketType::ZeroRtt => Some(EncryptionLevel::ZeroRtt),
            PacketType::Handshake => Some(EncryptionLevel::Handshake),
            PacketType::OneRtt => Some(EncryptionLevel::OneRtt),
            _ => None,
        }
    }

    /// The packet number space this type draws from, if any.
    pub fn packet_number_space(self) -> Option<PacketNumberSpace> {
        self.encryption_level().map(EncryptionLevel::space)
    }
}

/// A typed QUIC packet: header plus payload plus send-time metadata.
///
/// Immutable after construction. For received packets the payload is the
/// decrypted plaintext and `wire` holds the original datagram; for outbound
/// packets the payload is the caller's plaintext and `wire` holds the fully
/// protected serialization.
#[derive(Debug)]
pub struct Packet {
    packet_type: PacketType,
    header: Header,
    payload: Bytes,
    wire: Bytes,
    from: Option<SocketAddr>,
    retransmittable: bool,
    probing: bool,
}

impl Packet {
    /// A packet received from `from`, already unprotected and decrypted.
    pub(crate) fn received(
        header: Header,
        payload: Bytes,
        wire: Bytes,
        from: SocketAddr,
    ) -> Self {
        Self {
            packet_type: header.packet_type(),
            header,
            payload,
            wire,
            from: Some(from),
            retransmittable: false,
            probing: false,
        }
    }

    /// An outbound packet with its protected wire image.
    pub(crate) fn outbound(
        header: Header,
        payload: Bytes,
        wire: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Self {
        Self {
            packet_type: header.packet_type(),
            header,
            payload,
            wire,
            from: None,
            retransmittable,
            probing,
        }
    }

    /// A stateless reset. The nominal header records the CID the reset is
    /// addressed to; the wire image is the random-looking datagram.
    pub(crate) fn stateless_reset(header: Header, wire: Bytes) -> Self {
        Self {
            packet_type: PacketType::StatelessReset,
            header,
            payload: Bytes::new(),
            wire,
            from: None,
            retransmittable: false,
            probing: false,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn destination_cid(&self) -> &ConnectionId {
        self.header.destination_cid()
    }

    pub fn source_cid(&self) -> ConnectionId {
        self.header.source_cid()
    }

    pub fn packet_number(&self) -> Option<PacketNumber> {
        self.header.packet_number()
    }

    pub fn version(&self) -> Option<Version> {
        self.header.version()
    }

    pub fn key_phase(&self) -> KeyPhase {
        self.header.key_phase()
    }

    /// Peer address, present on received packets.
    pub fn from(&self) -> Option<SocketAddr> {
        self.from
    }

    /// Decrypted (received) or plaintext (outbound) payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Header size in bytes, including the packet number field.
    pub fn header_size(&self) -> usize {
        self.header.size()
    }

    /// Size of the whole packet on the wire.
    pub fn size(&self) -> usize {
        self.wire.len()
    }

    /// The serialized packet as it appears on the wire. For outbound packets
    /// this is the protected datagram to hand to the I/O layer.
    pub fn to_bytes(&self) -> Bytes {
        self.wire.clone()
    }

    /// Whether the payload carries ack-eliciting frames.
    pub fn is_retransmittable(&self) -> bool {
        self.retransmittable
    }

    /// Whether the payload carries only probing frames.
    pub fn is_probing_packet(&self) -> bool {
        self.probing
    }
}
