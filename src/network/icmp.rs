//! ICMP (Internet Control Message Protocol) implementation
//!
//! This module provides the ICMP message used by the forwarding path: time
//! exceeded, generated when a router drops a datagram whose TTL expired.
//! The header layout follows RFC 792.

use byteorder::{BigEndian, ByteOrder};

use crate::network::checksum;

/// Minimum ICMP header length in bytes
const ICMP_HEADER_LEN: usize = 8;

/// Bytes of the discarded datagram echoed back to its sender: the 20-byte
/// header plus the first 8 bytes of payload.
const EMBEDDED_LEN: usize = 28;

/// ICMP message types
pub const ICMP_TYPE_TIME_EXCEEDED: u8 = 11;

/// Code for "time to live exceeded in transit"
pub const ICMP_CODE_TTL_EXCEEDED: u8 = 0;

/// ICMP packet header structure
///
/// Represents the standard 8-byte ICMP header as defined in RFC 792
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub msg_type: u8,  // ICMP message type
    pub msg_code: u8,  // ICMP message code
    pub checksum: u16, // ICMP checksum
    pub rest: [u8; 4], // Type-specific data; unused for time exceeded
}

impl IcmpHeader {
    /// Parse ICMP header from byte slice
    ///
    /// Returns None if the data is too short to contain a valid ICMP header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return None;
        }

        Some(IcmpHeader {
            msg_type: data[0],
            msg_code: data[1],
            checksum: BigEndian::read_u16(&data[2..4]),
            rest: data[4..8].try_into().unwrap(),
        })
    }

    /// Convert ICMP header to bytes
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0] = self.msg_type;
        bytes[1] = self.msg_code;
        BigEndian::write_u16(&mut bytes[2..4], self.checksum);
        bytes[4..8].copy_from_slice(&self.rest);
        bytes
    }
}

/// Build a time exceeded message for a datagram dropped by the router.
///
/// The message embeds the first 28 bytes of the discarded datagram (its
/// header and up to 8 payload bytes); a shorter datagram is embedded whole,
/// without padding. The checksum covers the entire message including the
/// embedded data.
pub fn time_exceeded(discarded: &[u8]) -> Vec<u8> {
    let embedded = &discarded[..discarded.len().min(EMBEDDED_LEN)];

    let header = IcmpHeader {
        msg_type: ICMP_TYPE_TIME_EXCEEDED,
        msg_code: ICMP_CODE_TTL_EXCEEDED,
        checksum: 0,
        rest: [0; 4],
    };

    let mut message = Vec::with_capacity(ICMP_HEADER_LEN + embedded.len());
    message.extend_from_slice(&header.to_bytes());
    message.extend_from_slice(embedded);

    let sum = checksum(&message);
    BigEndian::write_u16(&mut message[2..4], sum);

    message
}
