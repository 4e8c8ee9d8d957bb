//! Network layer state machine: local delivery, forwarding and
//! origination.
//!
//! One [`IpLayer`] instance is one node. A datagram addressed to the
//! node's own address is handed to the registered receiver (host role);
//! anything else is forwarded toward its destination, or answered with an
//! ICMP time exceeded message when its TTL runs out (router role).

use std::net::Ipv4Addr;

use log::{trace, warn};

use crate::link::LinkLayer;
use crate::network::icmp;
use crate::network::ipv4::{protocol, Ipv4Header, DEFAULT_TTL};
use crate::network::route::RoutingTable;
use crate::network::{checksum, verify_checksum, NetworkError};

/// Callback receiving `(source, destination, payload)` for every segment
/// delivered to the local transport layer.
pub type SegmentReceiver = Box<dyn FnMut(Ipv4Addr, Ipv4Addr, &[u8])>;

/// The IPv4 network layer of one node.
///
/// Owns the link layer below it, the forwarding table, the local address
/// and the identification counter for locally originated datagrams.
pub struct IpLayer {
    link: LinkLayer,
    routes: RoutingTable,
    local_addr: Option<Ipv4Addr>,
    receiver: Option<SegmentReceiver>,
    id_counter: u16,
    ignore_checksum: bool,
}

impl IpLayer {
    /// Build a network layer on top of a configured link layer.
    ///
    /// The link layer's `ignore_checksum` flag is inherited here and
    /// controls whether received headers are validated before dispatch.
    pub fn new(link: LinkLayer) -> Self {
        let ignore_checksum = link.ignore_checksum;
        IpLayer {
            link,
            routes: RoutingTable::new(),
            local_addr: None,
            receiver: None,
            // first increment wraps to identification 0
            id_counter: u16::MAX,
            ignore_checksum,
        }
    }

    /// Set this node's own IPv4 address.
    ///
    /// Datagrams received for any other destination are forwarded as a
    /// router instead of delivered.
    pub fn set_local_address(&mut self, addr: Ipv4Addr) {
        self.local_addr = Some(addr);
    }

    /// Replace the forwarding table with `(cidr, next_hop)` string pairs,
    /// e.g. `("10.0.0.0/24", "10.0.0.1")`. Entry order is preserved.
    pub fn set_forwarding_table<'a, I>(&mut self, pairs: I) -> Result<(), NetworkError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.routes = RoutingTable::parse(pairs)?;
        Ok(())
    }

    /// Register the callback invoked for segments addressed to this node.
    pub fn register_receiver(&mut self, receiver: SegmentReceiver) {
        self.receiver = Some(receiver);
    }

    /// Access the link layer, e.g. to attach serial lines.
    pub fn link_mut(&mut self) -> &mut LinkLayer {
        &mut self.link
    }

    fn next_identification(&mut self) -> u16 {
        self.id_counter = self.id_counter.wrapping_add(1);
        self.id_counter
    }

    /// Feed raw bytes received on the serial line connected to `peer`.
    ///
    /// Every datagram completed by this chunk is processed to completion,
    /// including any router send-out, before the call returns. A datagram
    /// that fails to process is logged and dropped without affecting the
    /// rest of the batch.
    pub fn receive_raw(&mut self, peer: Ipv4Addr, chunk: &[u8]) -> Result<(), NetworkError> {
        let datagrams = self.link.receive_raw(peer, chunk)?;
        for datagram in datagrams {
            if let Err(err) = self.handle_datagram(&datagram) {
                warn!("dropping datagram from {}: {}", peer, err);
            }
        }
        Ok(())
    }

    fn handle_datagram(&mut self, datagram: &[u8]) -> Result<(), NetworkError> {
        let header = Ipv4Header::from_bytes(datagram).ok_or(NetworkError::TruncatedHeader)?;
        let header_len = header.header_len();
        if datagram.len() < header_len {
            return Err(NetworkError::TruncatedHeader);
        }
        if !self.ignore_checksum && !verify_checksum(&datagram[..header_len]) {
            return Err(NetworkError::BadChecksum);
        }

        if self.local_addr == Some(header.dst_addr) {
            // Host role: only segments for the transport protocol are
            // delivered; everything else is dropped without an ICMP error.
            if header.protocol == protocol::TCP {
                if let Some(receiver) = self.receiver.as_mut() {
                    receiver(header.src_addr, header.dst_addr, &datagram[header_len..]);
                }
            } else {
                trace!("no local handler for protocol {}", header.protocol);
            }
            return Ok(());
        }

        // Router role; a TTL of 0 on the wire is already expired
        if header.ttl <= 1 {
            self.report_time_exceeded(&header, datagram)
        } else {
            self.forward(&header, datagram)
        }
    }

    /// Discard an expired datagram and notify its original sender.
    fn report_time_exceeded(
        &mut self,
        header: &Ipv4Header,
        datagram: &[u8],
    ) -> Result<(), NetworkError> {
        // The error travels back, so the next hop is resolved toward the
        // source of the discarded datagram.
        let next_hop = self
            .routes
            .lookup(header.src_addr)
            .ok_or(NetworkError::NoRoute(header.src_addr))?;
        let local_addr = self.local_addr.ok_or(NetworkError::NoLocalAddress)?;

        let message = icmp::time_exceeded(datagram);
        let reply = Ipv4Header::new(
            protocol::ICMP,
            self.next_identification(),
            DEFAULT_TTL,
            local_addr,
            header.src_addr,
            message.len(),
        )
        .into_datagram(&message);

        self.link.send(&reply, next_hop)?;
        Ok(())
    }

    /// Pass a datagram one hop closer to its destination.
    fn forward(&mut self, header: &Ipv4Header, datagram: &[u8]) -> Result<(), NetworkError> {
        let next_hop = self
            .routes
            .lookup(header.dst_addr)
            .ok_or(NetworkError::NoRoute(header.dst_addr))?;

        let header_len = header.header_len();
        let mut forwarded = datagram.to_vec();
        forwarded[8] = header.ttl - 1;
        forwarded[10] = 0;
        forwarded[11] = 0;
        let sum = checksum(&forwarded[..header_len]);
        forwarded[10..12].copy_from_slice(&sum.to_be_bytes());

        self.link.send(&forwarded, next_hop)?;
        Ok(())
    }

    /// Send a transport segment to `dst_addr`, originating it locally with
    /// a fresh identification and the default TTL.
    pub fn send(&mut self, segment: &[u8], dst_addr: Ipv4Addr) -> Result<(), NetworkError> {
        let next_hop = self
            .routes
            .lookup(dst_addr)
            .ok_or(NetworkError::NoRoute(dst_addr))?;
        let local_addr = self.local_addr.ok_or(NetworkError::NoLocalAddress)?;

        let datagram = Ipv4Header::new(
            protocol::TCP,
            self.next_identification(),
            DEFAULT_TTL,
            local_addr,
            dst_addr,
            segment.len(),
        )
        .into_datagram(segment);

        self.link.send(&datagram, next_hop)?;
        Ok(())
    }
}
