//! # Packet Factory (RFC 9000 Section 17, RFC 9001 Section 5)
//!
//! The factory is the packet layer's front door: it turns datagram bytes
//! from the I/O layer into typed [`Packet`]s and builds fully protected
//! outbound packets of every type.
//!
//! The factory holds the negotiated version, the crypto capability, and one
//! packet number generator per space. `set_version`, `set_protection`, and
//! `set_local_cid_length` are configuration operations and must not run
//! concurrently with build or parse calls; the builders themselves may be
//! driven from multiple workers.

#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::crypto::{EncryptionLevel, KeyPhase, PacketProtection};
use crate::error::{Error, Result};
use crate::packet::header::{
    Header, LongHeader, RetryHeader, ShortHeader, VersionNegotiationHeader, FIXED_BIT, FORM_BIT,
    LONG_RESERVED_BITS, SHORT_RESERVED_BITS,
};
use crate::packet::number::{calc_packet_number_len, PacketNumberGenerator};
use crate::packet::types::{Packet, PacketType};
use crate::packet::PacketNumberSpace;
use crate::types::{
    ConnectionId, PacketNumber, StatelessResetToken, STATELESS_RESET_TOKEN_LENGTH,
};
use crate::version::{is_supported_version, Version, SUPPORTED_VERSIONS, VERSION_NEGOTIATION};

/// Outcome of feeding a received datagram to [`PacketFactory::parse`].
///
/// None of these are fatal to the connection: on anything but `Success` the
/// datagram is simply dropped (or, for `NotReady`, buffered by the caller).
#[derive(Debug)]
pub enum PacketCreationResult {
    /// A typed packet was produced.
    Success(Packet),
    /// Recognizably not a processable QUIC packet; drop silently.
    Ignored,
    /// Keys for the required encryption level are not installed yet.
    NotReady,
    /// Malformed, truncated, or failed authentication.
    Failed,
    /// Long-header version outside the supported set; the upper layer may
    /// respond with Version Negotiation.
    UnsupportedVersion(u32),
    /// A packet number space is exhausted.
    NoAvailablePacketNumberSpace,
}

impl From<Error> for PacketCreationResult {
    fn from(e: Error) -> Self {
        match e {
            Error::UnsupportedVersion(v) => PacketCreationResult::UnsupportedVersion(v),
            Error::KeyNotAvailable(_) => PacketCreationResult::NotReady,
            Error::NoAvailablePacketNumberSpace => {
                PacketCreationResult::NoAvailablePacketNumberSpace
            }
            _ => PacketCreationResult::Failed,
        }
    }
}

/// Builds outbound packets and parses inbound datagrams.
pub struct PacketFactory {
    version: Version,
    local_cid_len: usize,
    protection: Option<Arc<dyn PacketProtection>>,
    generators: [PacketNumberGenerator; 3],
}

impl Default for PacketFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketFactory {
    pub fn new() -> Self {
        Self {
            version: SUPPORTED_VERSIONS[0],
            local_cid_len: 8,
            protection: None,
            generators: [
                PacketNumberGenerator::new(),
                PacketNumberGenerator::new(),
                PacketNumberGenerator::new(),
            ],
        }
    }

    /// Set the negotiated version used for outbound long headers.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Set the length of CIDs this endpoint issues, needed to parse inbound
    /// short headers (the length is not encoded on the wire).
    pub fn set_local_cid_length(&mut self, len: usize) {
        self.local_cid_len = len;
    }

    /// Install the packet protection capability.
    pub fn set_protection(&mut self, protection: Arc<dyn PacketProtection>) {
        self.protection = Some(protection);
    }

    /// The generator for a packet number space. Exposed so the upper layer
    /// can reset a space when its keys are discarded.
    pub fn pn_generator(&self, space: PacketNumberSpace) -> &PacketNumberGenerator {
        &self.generators[space.index()]
    }

    /// Rewind all packet number spaces (e.g. on connection retry).
    pub fn reset(&self) {
        for generator in &self.generators {
            generator.reset();
        }
    }

    /// Whether 1-RTT keys are installed.
    pub fn is_ready_to_create_protected_packet(&self) -> bool {
        self.protection
            .as_ref()
            .is_some_and(|p| p.has_key(EncryptionLevel::OneRtt))
    }

    fn protection(&self) -> Result<&Arc<dyn PacketProtection>> {
        self.protection
            .as_ref()
            .ok_or(Error::KeyNotAvailable(EncryptionLevel::Initial))
    }

    // ======================================================================
    // Inbound
    // ======================================================================

    /// Parse one packet from the front of `datagram`.
    ///
    /// `base_pn` is the largest packet number processed so far in the
    /// matching space; it anchors packet number reconstruction.
    pub fn parse(
        &self,
        from: SocketAddr,
        datagram: Bytes,
        base_pn: PacketNumber,
    ) -> PacketCreationResult {
        match self.parse_inner(from, &datagram, base_pn) {
            Ok(result) => result,
            Err(e) => {
                debug!(error = %e, len = datagram.len(), "dropping datagram");
                e.into()
            }
        }
    }

    fn parse_inner(
        &self,
        from: SocketAddr,
        datagram: &Bytes,
        base_pn: PacketNumber,
    ) -> Result<PacketCreationResult> {
        let &first = datagram.first().ok_or(Error::BufferTooShort)?;

        if first & FORM_BIT != 0 {
            self.parse_long(first, from, datagram, base_pn)
        } else {
            self.parse_short(first, from, datagram, base_pn)
        }
    }

    fn parse_long(
        &self,
        first: u8,
        from: SocketAddr,
        datagram: &Bytes,
        base_pn: PacketNumber,
    ) -> Result<PacketCreationResult> {
        let version = LongHeader::version_of(datagram)?;

        if version == VERSION_NEGOTIATION {
            let header = Header::parse(datagram, 0, 0)?;
            let packet = Packet::received(header, Bytes::new(), datagram.clone(), from);
            return Ok(PacketCreationResult::Success(packet));
        }

        if !is_supported_version(version) {
            debug!(version, "unsupported version");
            return Ok(PacketCreationResult::UnsupportedVersion(version));
        }

        if first & FIXED_BIT == 0 {
            return Ok(PacketCreationResult::Ignored);
        }

        let packet_type = LongHeader::packet_type_of(datagram)?;

        if packet_type == PacketType::Retry {
            let header = Header::parse(datagram, 0, 0)?;
            let token = match &header {
                Header::Retry(h) => h.retry_token.clone(),
                _ => Bytes::new(),
            };
            let packet = Packet::received(header, token, datagram.clone(), from);
            return Ok(PacketCreationResult::Success(packet));
        }

        let level = packet_type
            .encryption_level()
            .ok_or(Error::InvalidPacket)?;
        let protection = self.protection()?;
        if !protection.has_key(level) {
            return Ok(PacketCreationResult::NotReady);
        }

        let pn_offset = LongHeader::packet_number_offset(datagram)?;
        let mut buf = BytesMut::from(&datagram[..]);
        let (pn_len, _) = super::protection::remove_protection(
            &mut buf,
            pn_offset,
            protection.as_ref(),
            level,
        )?;
        if buf[0] & LONG_RESERVED_BITS != 0 {
            return Err(Error::ReservedBitsViolation);
        }

        let header = Header::parse(&buf, 0, base_pn)?;
        let (packet_number, length) = match &header {
            Header::Long(h) => (h.packet_number, h.length),
            _ => return Err(Error::InvalidPacket),
        };

        let payload_offset = pn_offset + pn_len as usize;
        let ciphertext_len = (length as usize)
            .checked_sub(pn_len as usize)
            .ok_or(Error::InvalidPacket)?;
        if payload_offset + ciphertext_len > buf.len() {
            return Err(Error::BufferTooShort);
        }
        let payload = self.open_payload(
            protection.as_ref(),
            level,
            packet_number,
            &buf[..payload_offset],
            &buf[payload_offset..payload_offset + ciphertext_len],
        )?;

        let packet = Packet::received(header, payload, datagram.clone(), from);
        Ok(PacketCreationResult::Success(packet))
    }

    fn parse_short(
        &self,
        first: u8,
        from: SocketAddr,
        datagram: &Bytes,
        base_pn: PacketNumber,
    ) -> Result<PacketCreationResult> {
        if first & FIXED_BIT == 0 {
            return Ok(PacketCreationResult::Ignored);
        }

        let level = EncryptionLevel::OneRtt;
        let protection = self.protection()?;
        if !protection.has_key(level) {
            return Ok(PacketCreationResult::NotReady);
        }

        let pn_offset = ShortHeader::packet_number_offset(datagram, self.local_cid_len)?;
        let mut buf = BytesMut::from(&datagram[..]);
        let (pn_len, _) = super::protection::remove_protection(
            &mut buf,
            pn_offset,
            protection.as_ref(),
            level,
        )?;
        if buf[0] & SHORT_RESERVED_BITS != 0 {
            return Err(Error::ReservedBitsViolation);
        }

        let header = Header::parse(&buf, self.local_cid_len, base_pn)?;
        let packet_number = match &header {
            Header::Short(h) => h.packet_number,
            _ => return Err(Error::InvalidPacket),
        };

        let payload_offset = pn_offset + pn_len as usize;
        let payload = self.open_payload(
            protection.as_ref(),
            level,
            packet_number,
            &buf[..payload_offset],
            &buf[payload_offset..],
        )?;

        let packet = Packet::received(header, payload, datagram.clone(), from);
        Ok(PacketCreationResult::Success(packet))
    }

    fn open_payload(
        &self,
        protection: &dyn PacketProtection,
        level: EncryptionLevel,
        packet_number: PacketNumber,
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Bytes> {
        let mut plaintext = vec![0u8; ciphertext.len()];
        let n = protection
            .open(level, packet_number, aad, ciphertext, &mut plaintext)
            .map_err(|e| {
                warn!(?level, packet_number, "payload decryption failed");
                e
            })?;
        plaintext.truncate(n);
        Ok(Bytes::from(plaintext))
    }

    /// Whether `datagram` is a stateless reset carrying `token`: short-header
    /// shape with the token as the final bytes.
    pub fn is_stateless_reset(datagram: &[u8], token: &StatelessResetToken) -> bool {
        if datagram.len() < 1 + STATELESS_RESET_TOKEN_LENGTH {
            return false;
        }
        let first = datagram[0];
        if first & FORM_BIT != 0 || first & FIXED_BIT == 0 {
            return false;
        }
        &datagram[datagram.len() - STATELESS_RESET_TOKEN_LENGTH..] == token.as_bytes()
    }

    // ======================================================================
    // Outbound
    // ======================================================================

    /// Build a protected Initial packet carrying `token` (possibly empty).
    #[allow(clippy::too_many_arguments)]
    pub fn create_initial_packet(
        &self,
        dcid: ConnectionId,
        scid: ConnectionId,
        largest_acked: Option<PacketNumber>,
        token: Bytes,
        payload: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Result<Packet> {
        self.create_long_packet(
            PacketType::Initial,
            dcid,
            scid,
            largest_acked,
            token,
            payload,
            retransmittable,
            probing,
        )
    }

    /// Build a protected Handshake packet.
    pub fn create_handshake_packet(
        &self,
        dcid: ConnectionId,
        scid: ConnectionId,
        largest_acked: Option<PacketNumber>,
        payload: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Result<Packet> {
        self.create_long_packet(
            PacketType::Handshake,
            dcid,
            scid,
            largest_acked,
            Bytes::new(),
            payload,
            retransmittable,
            probing,
        )
    }

    /// Build a protected 0-RTT packet.
    pub fn create_zero_rtt_packet(
        &self,
        dcid: ConnectionId,
        scid: ConnectionId,
        largest_acked: Option<PacketNumber>,
        payload: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Result<Packet> {
        self.create_long_packet(
            PacketType::ZeroRtt,
            dcid,
            scid,
            largest_acked,
            Bytes::new(),
            payload,
            retransmittable,
            probing,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn create_long_packet(
        &self,
        packet_type: PacketType,
        dcid: ConnectionId,
        scid: ConnectionId,
        largest_acked: Option<PacketNumber>,
        token: Bytes,
        payload: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Result<Packet> {
        let level = packet_type
            .encryption_level()
            .ok_or(Error::InvalidPacket)?;
        let protection = self.protection()?;
        if !protection.has_key(level) {
            return Err(Error::KeyNotAvailable(level));
        }

        let packet_number = self.generators[level.space().index()].next()?;
        let packet_number_len = calc_packet_number_len(packet_number, largest_acked);
        let length =
            (packet_number_len as usize + payload.len() + protection.tag_len()) as u64;

        let header = Header::Long(LongHeader {
            packet_type,
            version: self.version,
            dcid,
            scid,
            token,
            length,
            packet_number,
            packet_number_len,
        });
        self.seal_and_protect(header, level, payload, retransmittable, probing)
    }

    /// Build a protected 1-RTT (short header) packet.
    pub fn create_protected_packet(
        &self,
        dcid: ConnectionId,
        largest_acked: Option<PacketNumber>,
        key_phase: KeyPhase,
        payload: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Result<Packet> {
        let level = EncryptionLevel::OneRtt;
        let protection = self.protection()?;
        if !protection.has_key(level) {
            return Err(Error::KeyNotAvailable(level));
        }

        let packet_number =
            self.generators[PacketNumberSpace::ApplicationData.index()].next()?;
        let packet_number_len = calc_packet_number_len(packet_number, largest_acked);

        let header = Header::Short(ShortHeader {
            dcid,
            key_phase,
            packet_number,
            packet_number_len,
        });
        self.seal_and_protect(header, level, payload, retransmittable, probing)
    }

    fn seal_and_protect(
        &self,
        header: Header,
        level: EncryptionLevel,
        payload: Bytes,
        retransmittable: bool,
        probing: bool,
    ) -> Result<Packet> {
        let protection = self.protection()?;
        let (pn_offset, pn_len, packet_number) = match &header {
            Header::Long(h) => (h.pn_offset(), h.packet_number_len, h.packet_number),
            Header::Short(h) => (h.pn_offset(), h.packet_number_len, h.packet_number),
            _ => return Err(Error::InvalidPacket),
        };

        let mut buf =
            BytesMut::with_capacity(header.size() + payload.len() + protection.tag_len());
        header.serialize(&mut buf)?;
        let header_len = buf.len();

        let mut ciphertext = vec![0u8; payload.len() + protection.tag_len()];
        let n = protection.seal(
            level,
            packet_number,
            &buf[..header_len],
            &payload,
            &mut ciphertext,
        )?;
        ciphertext.truncate(n);
        buf.extend_from_slice(&ciphertext);

        super::protection::apply_protection(
            &mut buf,
            pn_offset,
            pn_len,
            protection.as_ref(),
            level,
        )?;

        Ok(Packet::outbound(
            header,
            payload,
            buf.freeze(),
            retransmittable,
            probing,
        ))
    }

    /// Build a Retry packet. Carries no packet number and no protection at
    /// this layer.
    pub fn create_retry_packet(
        version: Version,
        dcid: ConnectionId,
        scid: ConnectionId,
        original_dcid: ConnectionId,
        retry_token: Bytes,
    ) -> Result<Packet> {
        let header = Header::Retry(RetryHeader {
            version,
            dcid,
            scid,
            original_dcid,
            retry_token: retry_token.clone(),
        });
        let mut buf = BytesMut::new();
        header.serialize(&mut buf)?;
        Ok(Packet::outbound(header, retry_token, buf.freeze(), false, false))
    }

    /// Build a Version Negotiation packet advertising `supported_versions`.
    pub fn create_version_negotiation_packet(
        dcid: ConnectionId,
        scid: ConnectionId,
        supported_versions: &[Version],
    ) -> Result<Packet> {
        let header = Header::VersionNegotiation(VersionNegotiationHeader {
            dcid,
            scid,
            supported_versions: supported_versions.to_vec(),
        });
        let mut buf = BytesMut::new();
        header.serialize(&mut buf)?;
        Ok(Packet::outbound(header, Bytes::new(), buf.freeze(), false, false))
    }

    /// Build a stateless reset: a random-looking short-header datagram with
    /// the reset token as its final bytes.
    pub fn create_stateless_reset_packet(
        dcid: ConnectionId,
        token: StatelessResetToken,
    ) -> Result<Packet> {
        // Unpredictable filler so the datagram is indistinguishable from a
        // genuine short-header packet.
        let mut random = [0u8; 24];
        getrandom::getrandom(&mut random).map_err(|e| {
            warn!(error = %e, "no entropy for stateless reset");
            Error::InvalidPacket
        })?;

        let mut buf = BytesMut::with_capacity(
            1 + dcid.len() + random.len() - 1 + STATELESS_RESET_TOKEN_LENGTH,
        );
        buf.extend_from_slice(&[FIXED_BIT | (random[0] & 0x3f)]);
        buf.extend_from_slice(dcid.as_bytes());
        buf.extend_from_slice(&random[1..]);
        buf.extend_from_slice(token.as_bytes());

        let header = Header::Short(ShortHeader {
            dcid,
            key_phase: KeyPhase::Initial,
            packet_number: u64::from(random[1]),
            packet_number_len: 1,
        });
        Ok(Packet::stateless_reset(header, buf.freeze()))
    }
}
