//! Virtual network descriptors: domain name, DHCP reservations, DNS hosts.
//!
//! Reads fetch a fresh descriptor on every call. Writes build one fragment
//! (see [`crate::fragment`]) and issue exactly one update; they never read the
//! network first, so deleting a missing entry is reported by the daemon.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::fragment;
use crate::traits::{DescriptorSource, NetworkUpdater};
use crate::types::{DhcpHostEntry, DnsHostEntry, NetworkUpdate};
use crate::xml::Element;

/// One `<ip>` block of a network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpBlock {
    pub address: Option<String>,
    pub netmask: Option<String>,
    pub prefix: Option<u8>,
    /// Static reservations from `<dhcp><host>`
    pub dhcp_hosts: Vec<DhcpHostEntry>,
}

impl IpBlock {
    fn from_element(ip: &Element) -> Self {
        let dhcp_hosts = ip
            .child("dhcp")
            .map(|dhcp| {
                dhcp.children("host")
                    .filter_map(|host| {
                        Some(DhcpHostEntry {
                            mac: host.attr("mac")?.to_string(),
                            name: host.attr("name").map(str::to_string),
                            ip: host.attr("ip")?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            address: ip.attr("address").map(str::to_string),
            netmask: ip.attr("netmask").map(str::to_string),
            prefix: ip.attr("prefix").and_then(|p| p.parse().ok()),
            dhcp_hosts,
        }
    }

    /// IPv4 address and mask, when both are present and well formed.
    fn ipv4_subnet(&self) -> Option<(Ipv4Addr, u32)> {
        let address: Ipv4Addr = self.address.as_deref()?.parse().ok()?;

        let mask = match (&self.netmask, self.prefix) {
            (Some(netmask), _) => u32::from(netmask.parse::<Ipv4Addr>().ok()?),
            (None, Some(prefix)) if prefix <= 32 => {
                u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
            }
            _ => return None,
        };

        Some((address, mask))
    }
}

/// Parsed `<network>` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub name: Option<String>,
    /// `name` attribute of the first `<domain>` element
    pub domain_name: Option<String>,
    pub ips: Vec<IpBlock>,
    pub dns_hosts: Vec<DnsHostEntry>,
}

impl NetworkDescriptor {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse_root(xml, "network")?;

        let dns_hosts = root
            .child("dns")
            .map(|dns| {
                dns.children("host")
                    .filter_map(|host| host.attr("ip").map(|ip| (ip, host)))
                    .flat_map(|(ip, host)| {
                        host.children("hostname").map(move |hostname| DnsHostEntry {
                            ip: ip.to_string(),
                            name: hostname.text().to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name: root.child("name").map(|n| n.text().to_string()),
            domain_name: root
                .child_attr("domain", "name")
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            ips: root.children("ip").map(IpBlock::from_element).collect(),
            dns_hosts,
        })
    }

    /// Static DHCP reservations across all `<ip>` blocks, in document order.
    pub fn dhcp_hosts(&self) -> impl Iterator<Item = &DhcpHostEntry> {
        self.ips.iter().flat_map(|ip| ip.dhcp_hosts.iter())
    }

    /// First free host address in the first IPv4 block.
    ///
    /// Skips the network and broadcast addresses, the block's own (gateway)
    /// address, every DHCP reservation and anything in `extra_used` (active
    /// leases, typically).
    pub fn next_free_address(&self, extra_used: &[Ipv4Addr]) -> Option<Ipv4Addr> {
        let (gateway, mask) = self.ips.iter().find_map(IpBlock::ipv4_subnet)?;

        let mut used: HashSet<Ipv4Addr> = self
            .dhcp_hosts()
            .filter_map(|host| host.ip.parse().ok())
            .collect();
        used.insert(gateway);
        used.extend(extra_used.iter().copied());

        let network = u32::from(gateway) & mask;
        let broadcast = network | !mask;

        (network.saturating_add(1)..broadcast)
            .map(Ipv4Addr::from)
            .find(|candidate| !used.contains(candidate))
    }
}

/// Fetch and parse a network's descriptor.
pub async fn fetch_network<N: DescriptorSource + ?Sized>(net: &N) -> Result<NetworkDescriptor> {
    let xml = net.xml_desc().await?;
    debug!(xml = %xml, "Fetched network XML");
    NetworkDescriptor::parse(&xml)
}

/// DNS domain name configured on the network.
///
/// `None` both when `<domain>` is missing and when it has no `name`.
#[instrument(skip(net))]
pub async fn domain_name<N: DescriptorSource + ?Sized>(net: &N) -> Result<Option<String>> {
    Ok(fetch_network(net).await?.domain_name)
}

/// Static DHCP reservations, in document order. Empty when the network has no
/// `<ip>` or `<dhcp>` element.
#[instrument(skip(net))]
pub async fn dhcp_hosts<N: DescriptorSource + ?Sized>(net: &N) -> Result<Vec<DhcpHostEntry>> {
    let descriptor = fetch_network(net).await?;
    Ok(descriptor.dhcp_hosts().cloned().collect())
}

/// Reservations bound to any of `macs`.
#[instrument(skip(net, macs))]
pub async fn dhcp_hosts_for_macs<N: DescriptorSource + ?Sized>(
    net: &N,
    macs: &[String],
) -> Result<Vec<DhcpHostEntry>> {
    let descriptor = fetch_network(net).await?;
    Ok(descriptor
        .dhcp_hosts()
        .filter(|host| macs.iter().any(|mac| mac.eq_ignore_ascii_case(&host.mac)))
        .cloned()
        .collect())
}

/// Static DNS host records, one per hostname, in document order.
#[instrument(skip(net))]
pub async fn dns_hosts<N: DescriptorSource + ?Sized>(net: &N) -> Result<Vec<DnsHostEntry>> {
    Ok(fetch_network(net).await?.dns_hosts)
}

/// First unreserved address of the network. See
/// [`NetworkDescriptor::next_free_address`].
///
/// Choosing an address and reserving it are separate round trips; callers
/// racing on the same network should hold a [`crate::MutationLocks`] guard.
#[instrument(skip(net, extra_used))]
pub async fn next_free_address<N: DescriptorSource + ?Sized>(
    net: &N,
    extra_used: &[Ipv4Addr],
) -> Result<Option<Ipv4Addr>> {
    Ok(fetch_network(net).await?.next_free_address(extra_used))
}

async fn apply<N: NetworkUpdater + ?Sized>(net: &N, update: NetworkUpdate) -> Result<()> {
    fragment::check_fragment(&update.xml)?;

    debug!(
        command = ?update.command,
        section = ?update.section,
        xml = %String::from_utf8_lossy(&update.xml),
        "Applying network update"
    );

    net.update(
        update.command,
        update.section,
        update.parent_index,
        &update.xml,
        update.flags,
    )
    .await
}

/// Add a static DHCP reservation (live and persistent).
#[instrument(skip(net))]
pub async fn add_dhcp_host<N: NetworkUpdater + ?Sized>(
    net: &N,
    name: &str,
    mac: &str,
    ip: &str,
) -> Result<()> {
    apply(net, fragment::add_dhcp_host(name, mac, ip)).await?;
    info!("DHCP host added");
    Ok(())
}

/// Delete the static DHCP reservation for `ip`.
#[instrument(skip(net))]
pub async fn delete_dhcp_host<N: NetworkUpdater + ?Sized>(net: &N, ip: &str) -> Result<()> {
    apply(net, fragment::delete_dhcp_host(ip)).await?;
    info!("DHCP host deleted");
    Ok(())
}

/// Add a static DNS host record (live and persistent).
#[instrument(skip(net))]
pub async fn add_dns_host<N: NetworkUpdater + ?Sized>(net: &N, name: &str, ip: &str) -> Result<()> {
    apply(net, fragment::add_dns_host(name, ip)).await?;
    info!("DNS host added");
    Ok(())
}

/// Delete the static DNS host record for `ip`.
#[instrument(skip(net))]
pub async fn delete_dns_host<N: NetworkUpdater + ?Sized>(net: &N, ip: &str) -> Result<()> {
    apply(net, fragment::delete_dns_host(ip)).await?;
    info!("DNS host deleted");
    Ok(())
}
