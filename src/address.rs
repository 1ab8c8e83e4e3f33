use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::QueryError;

/// A node or directory endpoint, as `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Address {
            host: host.into(),
            port,
        }
    }

    /// Build an address from a big-endian IPv4 integer and port, as carried
    /// in directory records.
    pub fn from_raw(ip: u32, port: u16) -> Self {
        Address::new(decode(ip), port)
    }
}

/// Split `s` on its first `:` into host and port.
///
/// ```
/// # use rfivemquery::address::parse_address;
/// let addr = parse_address("203.0.113.2:30130").unwrap();
/// assert_eq!(addr.host, "203.0.113.2");
/// assert_eq!(addr.port, 30130);
/// ```
pub fn parse_address(s: &str) -> Result<Address, QueryError> {
    let (host, port) = s
        .split_once(':')
        .ok_or_else(|| QueryError::InvalidAddressFormat(s.to_owned()))?;
    if host.is_empty() {
        return Err(QueryError::InvalidAddressFormat(s.to_owned()));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| QueryError::InvalidAddressFormat(s.to_owned()))?;

    Ok(Address::new(host, port))
}

impl FromStr for Address {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Dotted-decimal form of a big-endian IPv4 integer, most significant octet first.
pub fn decode(ip: u32) -> String {
    Ipv4Addr::from(ip).to_string()
}

/// Inverse of [decode].
pub fn encode(ip: &str) -> Result<u32, QueryError> {
    let ip: Ipv4Addr = ip
        .parse()
        .map_err(|_| QueryError::InvalidAddressFormat(ip.to_owned()))?;
    Ok(u32::from(ip))
}
