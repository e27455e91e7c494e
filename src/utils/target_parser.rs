//! Target parsing: turns a raw target specification into a scannable range
//!
//! Resolution rules:
//! - a bare address is widened to its enclosing /24 (`10.0.0.5` -> `10.0.0.0/24`);
//!   bare IPv6 addresses get the same 8 host bits (/120)
//! - CIDR input is used as given, with host bits silently masked off
//!   (`192.168.1.7/30` -> `192.168.1.4/30`)
//! - IPv4 prefixes may also be written as dotted netmasks (`10.0.0.0/255.255.0.0`)
//!   or hostmasks (`10.0.0.0/0.0.255.255`)
//!
//! Resolution is pure: no DNS lookups, no I/O.

use crate::error::ResolutionError;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Prefix a bare IPv4 address is widened to
pub const IPV4_HOST_PREFIX: u8 = 24;

/// Prefix a bare IPv6 address is widened to
pub const IPV6_HOST_PREFIX: u8 = 120;

/// Maximum length of a range identifier (spreadsheet sheet-name limit)
pub const RANGE_ID_MAX_LEN: usize = 31;

/// A normalized network/prefix pair. The network address never has host bits set.
///
/// Serialized as its CIDR string; deserializing goes back through [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddressRange {
    network: IpAddr,
    prefix: u8,
}

impl AddressRange {
    /// Build the range of the given prefix length that contains `address`
    pub fn containing(address: IpAddr, prefix: u8) -> Result<Self, ipnetwork::IpNetworkError> {
        let network = IpNetwork::new(address, prefix)?;
        Ok(Self {
            network: network.network(),
            prefix: network.prefix(),
        })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn is_ipv4(&self) -> bool {
        self.network.is_ipv4()
    }

    /// Highest address in the range (the broadcast address for IPv4)
    pub fn last_address(&self) -> IpAddr {
        to_addr(self.is_ipv4(), self.base() | self.host_mask())
    }

    /// Number of addresses `hosts()` yields.
    ///
    /// Network and broadcast addresses are excluded; /31 and /32 (and /127,
    /// /128) keep every address, so no range is ever empty.
    pub fn usable_host_count(&self) -> u128 {
        let (first, last) = self.usable_bounds();
        last - first + 1
    }

    /// Usable host addresses in ascending order
    pub fn hosts(&self) -> impl Iterator<Item = IpAddr> {
        let (first, last) = self.usable_bounds();
        let is_ipv4 = self.is_ipv4();
        (first..=last).map(move |raw| to_addr(is_ipv4, raw))
    }

    /// Identifier used to key this range in a report: `"<network>_<prefix>"`,
    /// cut to [`RANGE_ID_MAX_LEN`] characters.
    pub fn range_id(&self) -> String {
        self.to_string()
            .replace('/', "_")
            .chars()
            .take(RANGE_ID_MAX_LEN)
            .collect()
    }

    fn address_bits(&self) -> u8 {
        if self.is_ipv4() {
            32
        } else {
            128
        }
    }

    fn host_bits(&self) -> u32 {
        u32::from(self.address_bits() - self.prefix)
    }

    fn base(&self) -> u128 {
        match self.network {
            IpAddr::V4(addr) => u128::from(u32::from(addr)),
            IpAddr::V6(addr) => u128::from(addr),
        }
    }

    fn host_mask(&self) -> u128 {
        match self.host_bits() {
            bits if bits >= 128 => u128::MAX,
            bits => (1u128 << bits) - 1,
        }
    }

    fn usable_bounds(&self) -> (u128, u128) {
        let first = self.base();
        let last = first | self.host_mask();
        match (self.host_bits(), self.network) {
            (0, _) | (1, _) => (first, last),
            (_, IpAddr::V4(_)) => (first + 1, last - 1),
            // IPv6 has no broadcast; only the subnet-router anycast address is skipped
            (_, IpAddr::V6(_)) => (first + 1, last),
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for AddressRange {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

impl TryFrom<String> for AddressRange {
    type Error = ResolutionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.split_once('/') {
            Some((address, prefix)) => resolve_cidr(&s, address, prefix),
            None => Err(ResolutionError::InvalidCidr {
                reason: "missing prefix length".to_string(),
                spec: s,
            }),
        }
    }
}

impl From<AddressRange> for String {
    fn from(range: AddressRange) -> Self {
        range.to_string()
    }
}

fn to_addr(is_ipv4: bool, raw: u128) -> IpAddr {
    if is_ipv4 {
        IpAddr::V4(Ipv4Addr::from(raw as u32))
    } else {
        IpAddr::V6(Ipv6Addr::from(raw))
    }
}

/// Resolve a target specification into its canonical range
pub fn resolve(spec: &str) -> Result<AddressRange, ResolutionError> {
    let target = spec.trim();

    match target.split_once('/') {
        Some((address, prefix)) => resolve_cidr(spec, address, prefix),
        None => resolve_host(spec, target),
    }
}

fn resolve_host(spec: &str, target: &str) -> Result<AddressRange, ResolutionError> {
    let invalid = |reason: String| ResolutionError::InvalidAddress {
        spec: spec.to_string(),
        reason,
    };

    let address = target
        .parse::<IpAddr>()
        .map_err(|e| invalid(format!("'{}': {}", target, e)))?;

    let prefix = match address {
        IpAddr::V4(_) => IPV4_HOST_PREFIX,
        IpAddr::V6(_) => IPV6_HOST_PREFIX,
    };

    AddressRange::containing(address, prefix).map_err(|e| invalid(e.to_string()))
}

fn resolve_cidr(spec: &str, address: &str, prefix: &str) -> Result<AddressRange, ResolutionError> {
    let invalid = |reason: String| ResolutionError::InvalidCidr {
        spec: spec.to_string(),
        reason,
    };

    let address = address
        .parse::<IpAddr>()
        .map_err(|e| invalid(format!("invalid address '{}': {}", address, e)))?;
    let prefix = parse_prefix(address, prefix).map_err(invalid)?;

    AddressRange::containing(address, prefix)
        .map_err(|e| invalid(format!("prefix /{} rejected: {}", prefix, e)))
}

/// Accepts a decimal prefix length, or for IPv4 a dotted netmask or hostmask
fn parse_prefix(address: IpAddr, raw: &str) -> Result<u8, String> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse::<u8>()
            .map_err(|_| format!("invalid prefix length '{}'", raw));
    }

    match address {
        IpAddr::V4(_) => {
            let mask = raw
                .parse::<Ipv4Addr>()
                .map_err(|_| format!("invalid prefix length '{}'", raw))?;
            // netmask first, then the inverted form (`0.0.0.255` -> /24)
            ipnetwork::ipv4_mask_to_prefix(mask)
                .or_else(|_| ipnetwork::ipv4_mask_to_prefix(Ipv4Addr::from(!u32::from(mask))))
                .map_err(|_| format!("invalid netmask '{}'", raw))
        }
        IpAddr::V6(_) => Err(format!("invalid prefix length '{}'", raw)),
    }
}
