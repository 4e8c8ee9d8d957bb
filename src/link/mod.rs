//! Link layer implementation
//!
//! This module carries datagrams over raw byte-stream serial lines:
//! - SLIP escaping and streaming frame reassembly
//! - One endpoint per directly connected peer
//! - A registry dispatching outbound datagrams to the endpoint of their
//!   resolved next hop and collecting inbound datagrams per peer

pub mod endpoint;
pub mod slip;

#[cfg(test)]
pub(crate) mod testline;

use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;

use thiserror::Error;

pub use endpoint::LinkEndpoint;

/// Errors surfaced by the link layer.
#[derive(Debug, Error)]
pub enum LinkError {
    /// No serial line is attached for the requested address.
    #[error("no link endpoint registered for {0}")]
    NoEndpoint(Ipv4Addr),

    /// The underlying transport failed; propagated unmodified, never
    /// retried.
    #[error("serial line error: {0}")]
    Io(#[from] io::Error),
}

/// A raw byte-stream transport, e.g. one end of a serial line or PTY.
///
/// Implementations live outside this crate. The stack writes whole frames
/// through `transmit` and accepts received bytes in whatever chunks the
/// transport produces via [`LinkLayer::receive_raw`].
pub trait SerialLine {
    fn transmit(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Registry of link endpoints keyed by the address of the peer on the
/// other end of each serial line.
pub struct LinkLayer {
    endpoints: HashMap<Ipv4Addr, LinkEndpoint>,
    /// When set, the network layer skips header checksum validation on
    /// receive. Off by default.
    pub ignore_checksum: bool,
}

impl LinkLayer {
    pub fn new() -> Self {
        LinkLayer {
            endpoints: HashMap::new(),
            ignore_checksum: false,
        }
    }

    /// Attach a serial line whose far end is `peer`.
    ///
    /// Attaching a second line for the same peer replaces the first,
    /// discarding its receive buffer.
    pub fn attach(&mut self, peer: Ipv4Addr, line: Box<dyn SerialLine>) {
        self.endpoints.insert(peer, LinkEndpoint::new(line));
    }

    /// Send a datagram out of the endpoint registered for `next_hop`.
    pub fn send(&mut self, datagram: &[u8], next_hop: Ipv4Addr) -> Result<(), LinkError> {
        let endpoint = self
            .endpoints
            .get_mut(&next_hop)
            .ok_or(LinkError::NoEndpoint(next_hop))?;
        endpoint.send(datagram)
    }

    /// Feed bytes received from `peer`'s line, returning the datagrams they
    /// complete in arrival order.
    ///
    /// Ordering is only guaranteed within one peer's stream; across peers
    /// it is whatever order the caller delivers receive events in.
    pub fn receive_raw(&mut self, peer: Ipv4Addr, chunk: &[u8]) -> Result<Vec<Vec<u8>>, LinkError> {
        let endpoint = self
            .endpoints
            .get_mut(&peer)
            .ok_or(LinkError::NoEndpoint(peer))?;
        Ok(endpoint.receive_raw(chunk))
    }
}

impl Default for LinkLayer {
    fn default() -> Self {
        Self::new()
    }
}
