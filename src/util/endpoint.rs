//! Peer addressing.
//!
//! Mirrors the wire representation of a packed endpoint: a big-endian IPv4
//! address and port pair, kept distinct from `std::net::SocketAddr` because
//! fast-log events and transaction bookkeeping carry the raw fields rather
//! than a parsed address type.

#![allow(
    clippy::big_endian_bytes,
    reason = "endpoint fields are defined as big-endian on the wire"
)]

/// A peer address: IPv4 address and port, both host-order once decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// IPv4 address in host byte order.
    pub ip: u32,
    /// Port number in host byte order.
    pub port: u16,
}

impl Endpoint {
    /// The zero endpoint, used for events that have no meaningful peer
    /// (context init, join, reset, free).
    pub const UNSPECIFIED: Self = Self { ip: 0, port: 0 };

    /// Builds an endpoint from host-order fields.
    #[must_use]
    pub const fn new(ip: u32, port: u16) -> Self {
        Self { ip, port }
    }

    /// Decodes an endpoint from its packed big-endian wire form.
    #[must_use]
    pub fn from_be_bytes(ip: [u8; 4], port: [u8; 2]) -> Self {
        Self {
            ip: u32::from_be_bytes(ip),
            port: u16::from_be_bytes(port),
        }
    }

    /// Encodes the endpoint into its packed big-endian wire form.
    #[must_use]
    pub fn to_be_bytes(self) -> ([u8; 4], [u8; 2]) {
        (self.ip.to_be_bytes(), self.port.to_be_bytes())
    }
}
