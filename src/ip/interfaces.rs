//! Local network interface listings.
//!
//! Interface enumeration is platform-specific, so this crate only defines the
//! shape of a listing ([`InterfaceAddress`]) and the [`InterfaceSource`] seam
//! that a platform layer implements. Listings feed discovery and diagnostics,
//! never the request pipeline.

use super::{preferred_address, Ip};

/// One `{interface name, textual address}` pair from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    /// Interface name, e.g. `en0`
    pub name: String,
    /// Address as reported by the platform
    pub address: String,
}

impl InterfaceAddress {
    /// Create a new listing entry.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Parse the address.
    ///
    /// Link-local IPv6 addresses without a zone are scoped to this
    /// interface, since they are unusable without one.
    pub fn ip(&self) -> Option<Ip> {
        let ip = Ip::parse(&self.address)?;
        if ip.is_link_local() && ip.zone().is_none() {
            return Some(ip.with_zone(self.name.clone()));
        }
        Some(ip)
    }
}

/// A snapshot provider of local interface addresses.
pub trait InterfaceSource {
    /// List the current interface addresses.
    fn interfaces(&self) -> Vec<InterfaceAddress>;
}

/// Parse every address in a listing and apply the IPv6-first preference.
///
/// Entries that do not parse are skipped.
pub fn preferred_interface_ip(source: &dyn InterfaceSource) -> Option<Ip> {
    let ips: Vec<Ip> = source
        .interfaces()
        .iter()
        .filter_map(InterfaceAddress::ip)
        .collect();
    preferred_address(&ips).cloned()
}
