//! A minimal IPv4 stack over SLIP serial links
//!
//! This library implements the two lowest layers of a small TCP/IP stack:
//! - SLIP framing and streaming reassembly over raw byte-stream serial lines
//! - IPv4 datagram construction, local delivery and router forwarding
//! - ICMP time exceeded generation for datagrams whose TTL expires
//! - CIDR forwarding table with longest-prefix match lookup
//!
//! The physical transport (a PTY or serial port) and the transport layer
//! above are not part of this crate; they connect through the
//! [`SerialLine`] trait below and the receiver callback registered on
//! [`IpLayer`].

pub mod link;
pub mod network;

// Re-export commonly used types
pub use link::{LinkEndpoint, LinkError, LinkLayer, SerialLine};
pub use network::icmp::{IcmpHeader, ICMP_TYPE_TIME_EXCEEDED};
pub use network::ip::IpLayer;
pub use network::ipv4::{protocol, Ipv4Header};
pub use network::route::{RouteEntry, RoutingTable};
pub use network::NetworkError;
