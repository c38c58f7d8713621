//! Error types for packet-layer operations.

#![forbid(unsafe_code)]

use thiserror::Error;

use crate::crypto::EncryptionLevel;

/// Result alias for packet-layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by parsing, serialization, and packet construction.
///
/// Parse-side errors are non-fatal: the factory maps them onto a
/// [`crate::packet::PacketReadResult`] and the datagram is dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The buffer ended in the middle of a field.
    #[error("buffer too short")]
    BufferTooShort,

    /// The bytes are not a well-formed QUIC packet.
    #[error("invalid packet")]
    InvalidPacket,

    /// A connection ID length field exceeds the protocol maximum of 20.
    #[error("connection ID length {0} exceeds maximum of 20")]
    InvalidCidLength(usize),

    /// A long-header version outside the supported set.
    #[error("unsupported QUIC version {0:#010x}")]
    UnsupportedVersion(u32),

    /// No key material installed for the required encryption level yet.
    #[error("no key available for {0:?} level")]
    KeyNotAvailable(EncryptionLevel),

    /// AEAD open rejected the ciphertext.
    #[error("AEAD decryption failed")]
    AeadFailure,

    /// Reserved header bits were non-zero after header protection removal.
    #[error("reserved header bits set")]
    ReservedBitsViolation,

    /// A packet number space reached 2^62 and can issue no more numbers.
    #[error("packet number space exhausted")]
    NoAvailablePacketNumberSpace,

    /// Value does not fit the varint encoding.
    #[error("value {0} exceeds varint range")]
    VarIntOverflow(u64),
}
