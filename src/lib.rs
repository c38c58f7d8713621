//! # quic-packet: QUIC Packet Layer
//!
//! Data structures, parsers, serializers, and factory logic for transforming
//! raw UDP datagram bytes into typed QUIC packets and back (RFC 8999,
//! RFC 9000 Section 12 and 17, RFC 9001 Section 5).
//!
//! ## Architecture Overview
//!
//! ```text
//! quic-packet/
//! ├── error          - Unified error enum shared by parse and build paths
//! ├── types          - Varint codec, bounds-checked readers, connection IDs
//! ├── version        - Version constants and supported-version checks
//! ├── crypto         - PacketProtection capability consumed by the factory
//! └── packet         - Headers, packet numbers, header protection, factory
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure state machine**: no I/O, sockets, or threads. Datagram bytes in,
//!    typed packets out. The only mutable state is the per-space packet
//!    number counters, which are atomic.
//!
//! 2. **Crypto by capability**: AEAD and header-protection masking are
//!    delegated to an injected [`crypto::PacketProtection`] implementation.
//!    The factory holds it by shared reference and never mutates it.
//!
//! 3. **Byte-faithful round trips**: serializing a header and parsing it back
//!    (with the same connection-context CID length for short headers)
//!    reproduces the original value.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use quic_packet::{PacketCreationResult, PacketFactory};
//!
//! let mut factory = PacketFactory::new();
//! factory.set_protection(crypto_capability);
//!
//! match factory.parse(peer_addr, datagram, largest_received_pn) {
//!     PacketCreationResult::Success(packet) => handle(packet),
//!     PacketCreationResult::NotReady => buffer_for_later(datagram),
//!     PacketCreationResult::UnsupportedVersion(v) => send_version_negotiation(v),
//!     _ => { /* drop */ }
//! }
//! ```

#![forbid(unsafe_code)]

pub mod crypto;
pub mod error;
pub mod packet;
pub mod types;
pub mod version;

pub use crypto::{EncryptionLevel, KeyPhase, PacketProtection};
pub use error::{Error, Result};
pub use packet::{
    Header, LongHeader, Packet, PacketCreationResult, PacketFactory, PacketNumberGenerator,
    PacketNumberSpace, PacketType, RetryHeader, ShortHeader, VersionNegotiationHeader,
};
pub use types::{
    ConnectionId, PacketNumber, StatelessResetToken, VarIntCodec, MAX_CID_LENGTH,
    MAX_PACKET_NUMBER, STATELESS_RESET_TOKEN_LENGTH, VARINT_MAX,
};
pub use version::{Version, SUPPORTED_VERSIONS, VERSION_1, VERSION_NEGOTIATION};
