//! CIDR forwarding table with longest-prefix match lookup.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Errors raised when parsing forwarding table configuration strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteParseError {
    #[error("malformed CIDR entry {0:?}, expected \"a.b.c.d/n\"")]
    MalformedCidr(String),

    #[error("invalid IPv4 address {0:?}")]
    InvalidAddress(String),

    #[error("prefix length {0} out of range 0-32")]
    PrefixOutOfRange(u8),
}

/// One forwarding table entry: a network prefix routed via a next hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub net: Ipv4Addr,
    pub prefix: u8,
    pub next_hop: Ipv4Addr,
}

impl RouteEntry {
    /// Parse an `"a.b.c.d/n"` CIDR string and a dotted-quad next hop.
    pub fn parse(cidr: &str, next_hop: &str) -> Result<Self, RouteParseError> {
        let (net, prefix) = cidr
            .split_once('/')
            .ok_or_else(|| RouteParseError::MalformedCidr(cidr.to_string()))?;
        let net: Ipv4Addr = net
            .parse()
            .map_err(|_| RouteParseError::InvalidAddress(net.to_string()))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| RouteParseError::MalformedCidr(cidr.to_string()))?;
        if prefix > 32 {
            return Err(RouteParseError::PrefixOutOfRange(prefix));
        }
        let next_hop: Ipv4Addr = next_hop
            .parse()
            .map_err(|_| RouteParseError::InvalidAddress(next_hop.to_string()))?;

        Ok(RouteEntry {
            net,
            prefix,
            next_hop,
        })
    }

    /// Whether `addr` falls inside this entry's network.
    pub fn matches(&self, addr: Ipv4Addr) -> bool {
        // /0 has an empty mask and matches everything; a u32 shift by 32
        // would overflow
        let mask = match self.prefix {
            0 => 0,
            p => u32::MAX << (32 - u32::from(p)),
        };
        (u32::from(self.net) & mask) == (u32::from(addr) & mask)
    }
}

/// An insertion-ordered forwarding table.
///
/// Entries are not deduplicated. Lookup keeps replacing its candidate
/// whenever a matching entry has a prefix at least as long as the current
/// best, so among entries with equal prefix length the one added last wins.
#[derive(Debug, Default)]
pub struct RoutingTable {
    entries: Vec<RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        RoutingTable {
            entries: Vec::new(),
        }
    }

    /// Build a table from `(cidr, next_hop)` string pairs, preserving order.
    pub fn parse<'a, I>(pairs: I) -> Result<Self, RouteParseError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = RoutingTable::new();
        for (cidr, next_hop) in pairs {
            table.add(RouteEntry::parse(cidr, next_hop)?);
        }
        Ok(table)
    }

    /// Append an entry to the table.
    pub fn add(&mut self, entry: RouteEntry) {
        self.entries.push(entry);
    }

    /// Longest-prefix match lookup.
    ///
    /// Returns the next hop of the matching entry with the longest prefix,
    /// or None when no entry matches.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<Ipv4Addr> {
        let mut best: Option<&RouteEntry> = None;
        for entry in &self.entries {
            if !entry.matches(addr) {
                continue;
            }
            if best.map_or(true, |b| entry.prefix >= b.prefix) {
                best = Some(entry);
            }
        }
        best.map(|entry| entry.next_hop)
    }
}
