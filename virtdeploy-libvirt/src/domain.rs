//! Virtual machine descriptors: interface MAC bindings and disk sources.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::traits::DescriptorSource;
use crate::types::MacNetworkBinding;
use crate::xml::Element;

/// One `<interface>` device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDevice {
    /// The `type` attribute (`network`, `bridge`, ...)
    pub kind: Option<String>,
    pub mac: Option<String>,
    /// `source/@network`; only set for network-attached interfaces
    pub source_network: Option<String>,
}

/// Parsed `<domain>` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainDescriptor {
    pub name: Option<String>,
    pub interfaces: Vec<InterfaceDevice>,
    /// `devices/disk/source/@file`, in document order
    pub disk_sources: Vec<String>,
}

impl DomainDescriptor {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse_root(xml, "domain")?;
        let devices = root.child("devices");

        let interfaces = devices
            .map(|devices| {
                devices
                    .children("interface")
                    .map(|iface| InterfaceDevice {
                        kind: iface.attr("type").map(str::to_string),
                        mac: iface.child_attr("mac", "address").map(str::to_string),
                        source_network: iface.child_attr("source", "network").map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let disk_sources = devices
            .map(|devices| {
                devices
                    .children("disk")
                    .filter_map(|disk| disk.child_attr("source", "file"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            name: root.child("name").map(|n| n.text().to_string()),
            interfaces,
            disk_sources,
        })
    }

    /// One binding per interface carrying both a MAC and a source network.
    ///
    /// Incomplete interfaces are skipped rather than failing the whole list.
    pub fn mac_bindings(&self) -> Vec<MacNetworkBinding> {
        self.interfaces
            .iter()
            .filter_map(|iface| {
                Some(MacNetworkBinding {
                    mac: iface.mac.clone()?,
                    network: iface.source_network.clone()?,
                })
            })
            .collect()
    }
}

/// Group binding MACs by network name. Order within a network is preserved.
pub fn group_by_network(bindings: &[MacNetworkBinding]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for binding in bindings {
        grouped
            .entry(binding.network.clone())
            .or_default()
            .push(binding.mac.clone());
    }
    grouped
}

/// Fetch and parse a domain's descriptor.
pub async fn fetch_domain<D: DescriptorSource + ?Sized>(dom: &D) -> Result<DomainDescriptor> {
    let xml = dom.xml_desc().await?;
    debug!(xml = %xml, "Fetched domain XML");
    DomainDescriptor::parse(&xml)
}

/// (MAC, network) pairs of the domain's interfaces, in document order.
#[instrument(skip(dom))]
pub async fn mac_bindings<D: DescriptorSource + ?Sized>(dom: &D) -> Result<Vec<MacNetworkBinding>> {
    Ok(fetch_domain(dom).await?.mac_bindings())
}

/// Interface MACs grouped by attached network.
#[instrument(skip(dom))]
pub async fn bindings_by_network<D: DescriptorSource + ?Sized>(
    dom: &D,
) -> Result<BTreeMap<String, Vec<String>>> {
    let bindings = mac_bindings(dom).await?;
    Ok(group_by_network(&bindings))
}

/// File-backed disk images of the domain.
#[instrument(skip(dom))]
pub async fn disk_sources<D: DescriptorSource + ?Sized>(dom: &D) -> Result<Vec<String>> {
    Ok(fetch_domain(dom).await?.disk_sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockObject;

    const DOMXML_ONE_MACADDR: &str = r#"<domain type='kvm'>
  <devices>
    <interface type='network'>
      <mac address='52:54:00:a0:b0:01'/>
      <source network='default'/>
    </interface>
  </devices>
</domain>
"#;

    const DOMXML_MULTI_MACADDR: &str = r#"<domain type='kvm'>
  <name>1-centos-7.0-x86_64</name>
  <devices>
    <disk type='file' device='disk'>
      <source file='/var/lib/libvirt/images/1-centos-7.0-x86_64.qcow2'/>
    </disk>
    <interface type='network'>
      <mac address='52:54:00:a0:b0:01'/>
      <source network='default'/>
    </interface>
    <interface type='network'>
      <mac address='52:54:00:a0:b0:02'/>
      <source network='default'/>
    </interface>
    <interface type='network'>
      <mac address='52:54:00:a0:b0:03'/>
      <source network='othernet1'/>
    </interface>
  </devices>
</domain>
"#;

    fn binding(mac: &str, network: &str) -> MacNetworkBinding {
        MacNetworkBinding {
            mac: mac.to_string(),
            network: network.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_domain_one_mac_address() {
        let dom = MockObject::new(DOMXML_ONE_MACADDR);
        let macs = mac_bindings(&dom).await.unwrap();
        assert_eq!(macs, vec![binding("52:54:00:a0:b0:01", "default")]);
        assert_eq!(dom.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_domain_multi_mac_addresses() {
        let dom = MockObject::new(DOMXML_MULTI_MACADDR);
        let macs = mac_bindings(&dom).await.unwrap();
        assert_eq!(
            macs,
            vec![
                binding("52:54:00:a0:b0:01", "default"),
                binding("52:54:00:a0:b0:02", "default"),
                binding("52:54:00:a0:b0:03", "othernet1"),
            ]
        );
    }

    #[test]
    fn test_incomplete_interfaces_are_skipped() {
        let descriptor = DomainDescriptor::parse(
            r#"<domain type='kvm'>
  <devices>
    <interface type='bridge'>
      <mac address='52:54:00:a0:b0:01'/>
      <source bridge='br0'/>
    </interface>
    <interface type='network'>
      <source network='default'/>
    </interface>
    <interface type='network'>
      <mac address='52:54:00:a0:b0:03'/>
      <source network='default'/>
    </interface>
  </devices>
</domain>"#,
        )
        .unwrap();

        assert_eq!(descriptor.interfaces.len(), 3);
        assert_eq!(descriptor.interfaces[0].kind.as_deref(), Some("bridge"));
        assert_eq!(
            descriptor.mac_bindings(),
            vec![binding("52:54:00:a0:b0:03", "default")]
        );
    }

    #[test]
    fn test_domain_without_devices() {
        let descriptor = DomainDescriptor::parse("<domain type='kvm'/>").unwrap();
        assert!(descriptor.mac_bindings().is_empty());
        assert!(descriptor.disk_sources.is_empty());
    }

    #[tokio::test]
    async fn test_bindings_by_network() {
        let dom = MockObject::new(DOMXML_MULTI_MACADDR);
        let grouped = bindings_by_network(&dom).await.unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["default"], vec!["52:54:00:a0:b0:01", "52:54:00:a0:b0:02"]);
        assert_eq!(grouped["othernet1"], vec!["52:54:00:a0:b0:03"]);
    }

    #[tokio::test]
    async fn test_disk_sources() {
        let dom = MockObject::new(DOMXML_MULTI_MACADDR);
        let disks = disk_sources(&dom).await.unwrap();
        assert_eq!(disks, vec!["/var/lib/libvirt/images/1-centos-7.0-x86_64.qcow2"]);
    }
}
