//! IP address and prefix types with safe parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An IP address that can be either IPv4 or IPv6.
///
/// Serialized as its textual form (`"10.0.0.1"`, `"2001:db8::1"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum IpAddress {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl IpAddress {
    /// Creates an IPv4 address from its four octets.
    pub const fn v4(a: u8, b: u8, c: u8, d: u8) -> Self {
        IpAddress::V4(Ipv4Addr::new(a, b, c, d))
    }

    /// Returns true if this is an IPv4 address.
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    /// Returns true if this is an IPv6 address.
    pub const fn is_ipv6(&self) -> bool {
        matches!(self, IpAddress::V6(_))
    }

    /// Number of bits in an address of this family.
    pub const fn bit_len(&self) -> u8 {
        match self {
            IpAddress::V4(_) => 32,
            IpAddress::V6(_) => 128,
        }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddress::V4(addr) => addr.fmt(f),
            IpAddress::V6(addr) => addr.fmt(f),
        }
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpAddr>()
            .map(IpAddress::from)
            .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
    }
}

impl TryFrom<String> for IpAddress {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpAddress> for String {
    fn from(addr: IpAddress) -> Self {
        addr.to_string()
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => IpAddress::V4(v4),
            IpAddr::V6(v6) => IpAddress::V6(v6),
        }
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::V4(addr)
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::V6(addr)
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// Host bits of the stored address are ignored by [`IpPrefix::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IpPrefix {
    address: IpAddress,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddress, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = address.bit_len();
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Creates the host prefix (/32 or /128) for a single address.
    pub const fn host(address: IpAddress) -> Self {
        IpPrefix {
            address,
            prefix_len: address.bit_len(),
        }
    }

    /// Returns the address this prefix was built from.
    pub const fn address(&self) -> &IpAddress {
        &self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if this is a host route (/32 for IPv4, /128 for IPv6).
    pub const fn is_host_route(&self) -> bool {
        self.prefix_len == self.address.bit_len()
    }

    /// Returns true if this is the default route (0.0.0.0/0 or ::/0).
    pub fn is_default(&self) -> bool {
        self.prefix_len == 0
    }

    /// Returns this prefix with the host bits of its address cleared.
    pub fn network(&self) -> Self {
        let address = match self.address {
            IpAddress::V4(addr) => {
                IpAddress::V4(Ipv4Addr::from(u32::from(addr) & mask_u32(self.prefix_len)))
            }
            IpAddress::V6(addr) => {
                IpAddress::V6(Ipv6Addr::from(u128::from(addr) & mask_u128(self.prefix_len)))
            }
        };
        IpPrefix {
            address,
            prefix_len: self.prefix_len,
        }
    }

    /// Returns true if `ip` falls inside this prefix.
    ///
    /// Addresses of the other family are never contained.
    pub fn contains(&self, ip: &IpAddress) -> bool {
        match (self.address, ip) {
            (IpAddress::V4(net), IpAddress::V4(addr)) => {
                let mask = mask_u32(self.prefix_len);
                u32::from(net) & mask == u32::from(*addr) & mask
            }
            (IpAddress::V6(net), IpAddress::V6(addr)) => {
                let mask = mask_u128(self.prefix_len);
                u128::from(net) & mask == u128::from(*addr) & mask
            }
            _ => false,
        }
    }
}

fn mask_u32(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(len))
    }
}

fn mask_u128(len: u8) -> u128 {
    if len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(len))
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;

        let address: IpAddress = addr_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(prefix: IpPrefix) -> Self {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ip_address_discrimination() {
        let v4: IpAddress = "10.0.0.1".parse().unwrap();
        assert!(v4.is_ipv4());
        assert_eq!(v4, IpAddress::v4(10, 0, 0, 1));

        let v6: IpAddress = "::1".parse().unwrap();
        assert!(v6.is_ipv6());
        assert_eq!(v6.bit_len(), 128);
    }

    #[test]
    fn test_invalid_ip_address() {
        assert_eq!(
            "10.0.0".parse::<IpAddress>(),
            Err(ParseError::InvalidIpAddress("10.0.0".to_string()))
        );
    }

    #[test]
    fn test_ip_prefix_parse() {
        let prefix: IpPrefix = "10.0.0.0/24".parse().unwrap();
        assert_eq!(prefix.prefix_len(), 24);
        assert_eq!(prefix.to_string(), "10.0.0.0/24");

        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
        assert!("10.0.0.0".parse::<IpPrefix>().is_err());
    }

    #[test]
    fn test_ip_prefix_contains() {
        let prefix: IpPrefix = "10.0.0.0/24".parse().unwrap();
        assert!(prefix.contains(&IpAddress::v4(10, 0, 0, 5)));
        assert!(prefix.contains(&IpAddress::v4(10, 0, 0, 255)));
        assert!(!prefix.contains(&IpAddress::v4(10, 0, 1, 0)));
        assert!(!prefix.contains(&"::1".parse().unwrap()));
    }

    #[test]
    fn test_ip_prefix_contains_ignores_host_bits() {
        let prefix: IpPrefix = "192.168.1.77/16".parse().unwrap();
        assert!(prefix.contains(&IpAddress::v4(192, 168, 200, 1)));
    }

    #[test]
    fn test_ip_prefix_network() {
        let prefix: IpPrefix = "192.168.1.77/16".parse().unwrap();
        assert_eq!(prefix.network().to_string(), "192.168.0.0/16");
        assert_eq!(prefix.network().prefix_len(), 16);

        let default_v4: IpPrefix = "10.1.2.3/0".parse().unwrap();
        assert_eq!(default_v4.network().to_string(), "0.0.0.0/0");

        let v6: IpPrefix = "2001:db8::1/64".parse().unwrap();
        assert_eq!(v6.network().to_string(), "2001:db8::/64");
    }

    #[test]
    fn test_ip_prefix_default_and_host() {
        let default_v4: IpPrefix = "0.0.0.0/0".parse().unwrap();
        assert!(default_v4.is_default());
        assert!(default_v4.contains(&IpAddress::v4(8, 8, 8, 8)));

        let host = IpPrefix::host(IpAddress::v4(1, 1, 1, 1));
        assert!(host.is_host_route());
        assert!(host.contains(&IpAddress::v4(1, 1, 1, 1)));
        assert!(!host.contains(&IpAddress::v4(1, 1, 1, 2)));
    }

    #[test]
    fn test_ipv6_prefix_contains() {
        let prefix: IpPrefix = "2001:db8::/32".parse().unwrap();
        assert!(prefix.contains(&"2001:db8:1::1".parse().unwrap()));
        assert!(!prefix.contains(&"2001:db9::1".parse().unwrap()));
    }

    #[test]
    fn test_serde_textual_form() {
        let prefix: IpPrefix = "10.1.0.0/16".parse().unwrap();
        let json = serde_json::to_string(&prefix).unwrap();
        assert_eq!(json, "\"10.1.0.0/16\"");

        let addr: IpAddress = serde_json::from_str("\"172.16.0.1\"").unwrap();
        assert_eq!(addr, IpAddress::v4(172, 16, 0, 1));
        assert!(serde_json::from_str::<IpAddress>("\"not-an-ip\"").is_err());
    }
}
