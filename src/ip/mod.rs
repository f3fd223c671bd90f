//! IP address value type used for endpoint addressing.
//!
//! [`Ip`] holds either a 4-byte IPv4 address or a 16-byte IPv6 address with
//! an optional zone (interface) identifier, e.g. `fe80::1%en0`.
//!
//! # Textual forms
//!
//! | Form | IPv4 | IPv6 |
//! |------|------|------|
//! | [`Ip::canonical_string`] | `10.0.0.1` | `fe80::1%en0` |
//! | [`Ip::url_string`] | `10.0.0.1` | `[fe80::1%en0]` |
//!
//! # Binary form
//!
//! Only the raw address bytes are encoded (4 or 16). The zone is not part of
//! the binary form, so a zoned IPv6 address loses its zone across
//! [`Ip::to_bytes`] / [`Ip::decode`].
//!
//! # Examples
//!
//! ```
//! use typed_rest::Ip;
//!
//! let ip = Ip::parse("2001:0db8:0000:0000:0000:0000:0000:0001").unwrap();
//! assert_eq!(ip.canonical_string(), "2001:db8::1");
//! assert_eq!(ip.url_string(), "[2001:db8::1]");
//!
//! let v4 = Ip::parse("010.000.000.001").unwrap();
//! assert_eq!(v4.to_string(), "10.0.0.1");
//! ```

mod interfaces;

pub use interfaces::{preferred_interface_ip, InterfaceAddress, InterfaceSource};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

/// An IPv4 or IPv6 address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ip {
    /// IPv4 address
    V4([u8; 4]),
    /// IPv6 address with optional zone identifier
    V6 {
        /// Raw address bytes
        octets: [u8; 16],
        /// Interface the address is scoped to
        zone: Option<String>,
    },
}

/// Text that is neither an IPv6 nor an IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid IP address: {0:?}")]
pub struct IpParseError(pub String);

/// Binary input that is not a raw IPv4 or IPv6 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpDecodeError {
    /// Only 4 and 16 byte inputs are addresses.
    #[error("invalid IP address byte length {0}, expected 4 or 16")]
    InvalidLength(usize),
}

impl Ip {
    /// Parse a textual address.
    ///
    /// IPv6 is tried first so zone-qualified forms such as `fe80::1%eth0`
    /// are recognized, then IPv4 dotted quad.
    pub fn parse(text: &str) -> Option<Ip> {
        parse_v6(text).or_else(|| parse_v4(text).map(Ip::V4))
    }

    /// Interpret raw address bytes: 16 bytes are IPv6, 4 bytes IPv4.
    pub fn from_bytes(bytes: &[u8]) -> Option<Ip> {
        Self::decode(bytes).ok()
    }

    /// Decode raw address bytes, naming the length on failure.
    pub fn decode(bytes: &[u8]) -> Result<Ip, IpDecodeError> {
        if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
            return Ok(Ip::V6 { octets, zone: None });
        }
        if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
            return Ok(Ip::V4(octets));
        }
        Err(IpDecodeError::InvalidLength(bytes.len()))
    }

    /// Raw address bytes; the zone is dropped.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Ip::V4(octets) => octets.to_vec(),
            Ip::V6 { octets, .. } => octets.to_vec(),
        }
    }

    /// Canonical text, zone included for IPv6, no brackets.
    pub fn canonical_string(&self) -> String {
        self.to_string()
    }

    /// Host form usable in a URL authority: IPv6 is bracketed.
    pub fn url_string(&self) -> String {
        match self {
            Ip::V4(_) => self.to_string(),
            Ip::V6 { .. } => format!("[{}]", self),
        }
    }

    /// Returns `true` for IPv6 values.
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Ip::V6 { .. })
    }

    /// Returns `true` for IPv6 link-local (`fe80::/10`) addresses.
    pub fn is_link_local(&self) -> bool {
        match self {
            Ip::V6 { octets, .. } => octets[0] == 0xfe && (octets[1] & 0xc0) == 0x80,
            Ip::V4(_) => false,
        }
    }

    /// Zone identifier, if any.
    pub fn zone(&self) -> Option<&str> {
        match self {
            Ip::V6 { zone, .. } => zone.as_deref(),
            Ip::V4(_) => None,
        }
    }

    /// The same address scoped to `zone`. IPv4 values are returned unchanged.
    pub fn with_zone(self, zone: impl Into<String>) -> Ip {
        match self {
            Ip::V6 { octets, .. } => Ip::V6 {
                octets,
                zone: Some(zone.into()),
            },
            v4 => v4,
        }
    }
}

/// Pick the address to connect to: the first IPv6 in original order, else
/// the first IPv4.
///
/// ```
/// use typed_rest::{preferred_address, Ip};
///
/// let list: Vec<Ip> = ["127.0.0.1", "fe80::1%en0", "2003::1", "1.1.1.1"]
///     .iter()
///     .filter_map(|s| Ip::parse(s))
///     .collect();
/// assert_eq!(preferred_address(&list).unwrap().to_string(), "fe80::1%en0");
/// ```
pub fn preferred_address(addresses: &[Ip]) -> Option<&Ip> {
    addresses
        .iter()
        .find(|ip| ip.is_ipv6())
        .or_else(|| addresses.iter().find(|ip| !ip.is_ipv6()))
}

fn parse_v6(text: &str) -> Option<Ip> {
    let (address, zone) = match text.split_once('%') {
        Some((_, "")) => return None,
        Some((address, zone)) => (address, Some(zone.to_string())),
        None => (text, None),
    };
    let addr = Ipv6Addr::from_str(address).ok()?;
    Some(Ip::V6 {
        octets: addr.octets(),
        zone,
    })
}

fn parse_v4(text: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse::<u16>().ok().and_then(|n| u8::try_from(n).ok())?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

// Longest run of two or more zero groups collapses to `::`, first run wins ties.
fn write_v6(f: &mut fmt::Formatter<'_>, octets: &[u8; 16]) -> fmt::Result {
    let groups: Vec<u16> = octets
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    let (mut best_start, mut best_len) = (0, 0);
    let mut i = 0;
    while i < groups.len() {
        if groups[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < groups.len() && groups[i] == 0 {
            i += 1;
        }
        if i - start > best_len {
            best_start = start;
            best_len = i - start;
        }
    }

    let join = |groups: &[u16]| {
        groups
            .iter()
            .map(|g| format!("{:x}", g))
            .collect::<Vec<_>>()
            .join(":")
    };

    if best_len < 2 {
        return f.write_str(&join(&groups));
    }
    write!(
        f,
        "{}::{}",
        join(&groups[..best_start]),
        join(&groups[best_start + best_len..])
    )
}

impl fmt::Display for Ip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ip::V4([a, b, c, d]) => write!(f, "{}.{}.{}.{}", a, b, c, d),
            Ip::V6 { octets, zone } => {
                write_v6(f, octets)?;
                if let Some(zone) = zone {
                    write!(f, "%{}", zone)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Ip {
    type Err = IpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ip::parse(s).ok_or_else(|| IpParseError(s.to_string()))
    }
}

impl From<IpAddr> for Ip {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => Ip::V4(v4.octets()),
            IpAddr::V6(v6) => Ip::V6 {
                octets: v6.octets(),
                zone: None,
            },
        }
    }
}

impl From<&Ip> for IpAddr {
    fn from(ip: &Ip) -> Self {
        match ip {
            Ip::V4(octets) => IpAddr::V4(Ipv4Addr::from(*octets)),
            Ip::V6 { octets, .. } => IpAddr::V6(Ipv6Addr::from(*octets)),
        }
    }
}

impl Serialize for Ip {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for Ip {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_bytes(IpBytesVisitor)
    }
}

struct IpBytesVisitor;

impl<'de> Visitor<'de> for IpBytesVisitor {
    type Value = Ip;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("4 or 16 raw address bytes")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Ip, E> {
        Ip::decode(v).map_err(E::custom)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Ip, A::Error> {
        let mut bytes = Vec::with_capacity(16);
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ip::decode(&bytes).map_err(de::Error::custom)
    }
}
