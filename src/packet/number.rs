//! # Packet Number Encoding, Decoding, and Generation (RFC 9000 Section 17.1, A.2, A.3)
//!
//! Packet numbers are 62-bit values truncated to 1-4 bytes on the wire. The
//! sender picks the smallest truncation that the receiver can unambiguously
//! reverse; the receiver reconstructs the full value by window-centered
//! rounding around the next expected packet number.

#![forbid(unsafe_code)]

use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::types::{PacketNumber, MAX_PACKET_NUMBER};

/// Pick the truncated encoding length in bytes for `full`.
///
/// Returns the smallest `n` in 1..=4 such that `2^(8n-1)` exceeds the
/// distance from `largest_acked` to `full` (RFC 9000 Appendix A.2). With no
/// acknowledgment to anchor on, the widest encoding is used.
pub fn calc_packet_number_len(
    full: PacketNumber,
    largest_acked: Option<PacketNumber>,
) -> u8 {
    let base = match largest_acked {
        Some(base) => base,
        None => return 4,
    };
    let distance = full.saturating_sub(base);

    if distance < (1u64 << 7) {
        1
    } else if distance < (1u64 << 15) {
        2
    } else if distance < (1u64 << 23) {
        3
    } else {
        4
    }
}

/// Truncate `full` to its low `len` bytes.
pub fn encode_packet_number(full: PacketNumber, len: u8) -> u64 {
    debug_assert!((1..=4).contains(&len));
    full & (u64::MAX >> (64 - 8 * u32::from(len)))
}

/// Reconstruct a full packet number from its truncated wire form
/// (RFC 9000 Appendix A.3).
///
/// `largest_acked` is the highest packet number processed so far in this
/// space; the truncated value is resolved to the candidate closest to
/// `largest_acked + 1`.
pub fn decode_packet_number(
    truncated: u64,
    len: u8,
    largest_acked: PacketNumber,
) -> PacketNumber {
    let expected = largest_acked + 1;
    let win = 1u64 << (8 * u32::from(len));
    let hwin = win / 2;
    let mask = win - 1;

    let candidate = (expected & !mask) | truncated;

    // `candidate + hwin <= expected` is `candidate <= expected - hwin`
    // rearranged so it cannot underflow near zero.
    if candidate + hwin <= expected && candidate < (1u64 << 62) - win {
        candidate + win
    } else if candidate > expected + hwin && candidate >= win {
        candidate - win
    } else {
        candidate
    }
}

/// Per-space monotonic packet number source.
///
/// `next` is an atomic fetch-and-increment so concurrent send paths obtain
/// distinct numbers; it does not order serialization, so callers that need
/// wire order matching allocation order must serialize the encrypt/send
/// section themselves.
#[derive(Debug, Default)]
pub struct PacketNumberGenerator {
    current: AtomicU64,
}

impl PacketNumberGenerator {
    pub fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
        }
    }

    /// Take the next packet number.
    ///
    /// Fails with [`Error::NoAvailablePacketNumberSpace`] once the 62-bit
    /// space is exhausted.
    pub fn next(&self) -> Result<PacketNumber> {
        let pn = self.current.fetch_add(1, Ordering::SeqCst);
        if pn > MAX_PACKET_NUMBER {
            return Err(Error::NoAvailablePacketNumberSpace);
        }
        Ok(pn)
    }

    /// Rewind to zero. Used when the keys for this space are discarded.
    pub fn reset(&self) {
        self.current.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_len_small_distance() {
        assert_eq!(calc_packet_number_len(10, Some(5)), 1);
        assert_eq!(calc_packet_number_len(5, Some(5)), 1);
    }

    #[test]
    fn test_calc_len_widths() {
        assert_eq!(calc_packet_number_len(200, Some(5)), 2);
        assert_eq!(calc_packet_number_len(50_000, Some(5)), 3);
        assert_eq!(calc_packet_number_len(10_000_000, Some(5)), 4);
    }

    #[test]
    fn test_calc_len_without_ack_anchor() {
        assert_eq!(calc_packet_number_len(0, None), 4);
        assert_eq!(calc_packet_number_len(0xac5c02, None), 4);
    }

    #[test]
    fn test_calc_len_vector() {
        assert_eq!(calc_packet_number_len(0xac5c02, Some(0xabe8b3)), 2);
    }

    #[test]
    fn test_encode_truncation() {
        assert_eq!(encode_packet_number(0xac5c02, 2), 0x5c02);
        assert_eq!(encode_packet_number(0x12345678, 4), 0x12345678);
        assert_eq!(encode_packet_number(0x12345678, 1), 0x78);
    }

    #[test]
    fn test_decode_sequential() {
        assert_eq!(decode_packet_number(1, 1, 0), 1);
        assert_eq!(decode_packet_number(2, 1, 1), 2);
    }

    #[test]
    fn test_decode_vector() {
        assert_eq!(decode_packet_number(0x5c02, 2, 0xabe8b3), 0xac5c02);
    }

    #[test]
    fn test_decode_rolls_forward_across_window() {
        // The truncated byte wrapped; the nearest candidate is one window up.
        assert_eq!(decode_packet_number(0x00, 1, 0xff), 0x100);
        assert_eq!(decode_packet_number(0x00, 2, 0xffff), 0x10000);
    }

    #[test]
    fn test_decode_rolls_backward_across_window() {
        // A reordered packet from below the window boundary.
        assert_eq!(decode_packet_number(0xff, 1, 0x100), 0xff);
    }

    #[test]
    fn test_decode_first_packets_stay_in_window() {
        // Near zero the half-window comparison must not underflow and push
        // the first packets a full window forward.
        assert_eq!(decode_packet_number(0, 4, 0), 0);
        assert_eq!(decode_packet_number(0, 1, 0), 0);
        assert_eq!(decode_packet_number(5, 2, 3), 5);
    }

    #[test]
    fn test_decode_rfc_vector() {
        // RFC 9000 Appendix A.3 example
        assert_eq!(decode_packet_number(0x9b32, 2, 0xa82f30ea), 0xa82f9b32);
    }

    #[test]
    fn test_roundtrip_across_distances() {
        for (full, largest_acked) in [
            (42u64, 40u64),
            (1_000_000, 999_950),
            (0xac5c02, 0xabe8b3),
            (1u64 << 40, (1u64 << 40) - 9_000_000),
        ] {
            let len = calc_packet_number_len(full, Some(largest_acked));
            let truncated = encode_packet_number(full, len);
            assert_eq!(decode_packet_number(truncated, len, largest_acked), full);
        }
    }

    #[test]
    fn test_generator_sequence() {
        let generator = PacketNumberGenerator::new();
        assert_eq!(generator.next().unwrap(), 0);
        assert_eq!(generator.next().unwrap(), 1);
        assert_eq!(generator.next().unwrap(), 2);
        generator.reset();
        assert_eq!(generator.next().unwrap(), 0);
    }

    #[test]
    fn test_generator_exhaustion() {
        let generator = PacketNumberGenerator::new();
        generator.current.store(MAX_PACKET_NUMBER, Ordering::SeqCst);
        assert_eq!(generator.next().unwrap(), MAX_PACKET_NUMBER);
        assert_eq!(generator.next(), Err(Error::NoAvailablePacketNumberSpace));
    }
}
