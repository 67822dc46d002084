//! Libvirt backend implementation.

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use virt::connect::Connect;
use virt::domain::Domain;
use virt::network::Network;
use virt::storage_pool::StoragePool;
use virt::sys;

use crate::config::DriverConfig;
use crate::error::{DriverError, Result};
use crate::fragment;
use crate::traits::{DescriptorSource, NetworkUpdater};
use crate::types::{UpdateCommand, UpdateFlags, UpdateSection};

/// Connection to a libvirt daemon.
pub struct LibvirtDriver {
    config: DriverConfig,
    connection: Connect,
}

impl LibvirtDriver {
    /// Connect to the daemon at `config.uri`.
    ///
    /// Common URIs:
    /// - `qemu:///system` - System-wide QEMU/KVM
    /// - `qemu+ssh://user@host/system` - Remote via SSH
    pub async fn connect(config: &DriverConfig) -> Result<Self> {
        config.validate()?;
        info!(uri = %config.uri, "Connecting to libvirt");

        let connection = Connect::open(Some(config.uri.as_str()))
            .map_err(|e| DriverError::ConnectionFailed(e.to_string()))?;

        info!("Connected to libvirt");

        Ok(Self {
            config: config.clone(),
            connection,
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Look up a network by name.
    pub fn network(&self, name: &str) -> Result<LibvirtNetwork> {
        let network = Network::lookup_by_name(&self.connection, name)
            .map_err(|e| DriverError::ObjectNotFound(format!("network {}: {}", name, e)))?;
        Ok(LibvirtNetwork {
            name: name.to_string(),
            network,
        })
    }

    /// The configured default network.
    pub fn default_network(&self) -> Result<LibvirtNetwork> {
        self.network(&self.config.network)
    }

    /// Look up a domain by name.
    pub fn domain(&self, name: &str) -> Result<LibvirtDomain> {
        let domain = Domain::lookup_by_name(&self.connection, name)
            .map_err(|e| DriverError::ObjectNotFound(format!("domain {}: {}", name, e)))?;
        Ok(LibvirtDomain {
            name: name.to_string(),
            domain,
        })
    }

    /// Look up a storage pool by name.
    pub fn pool(&self, name: &str) -> Result<LibvirtPool> {
        let pool = StoragePool::lookup_by_name(&self.connection, name)
            .map_err(|e| DriverError::ObjectNotFound(format!("pool {}: {}", name, e)))?;
        Ok(LibvirtPool {
            name: name.to_string(),
            pool,
        })
    }

    /// The configured default storage pool.
    pub fn default_pool(&self) -> Result<LibvirtPool> {
        self.pool(&self.config.pool)
    }
}

/// A libvirt virtual network.
pub struct LibvirtNetwork {
    name: String,
    network: Network,
}

impl LibvirtNetwork {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl DescriptorSource for LibvirtNetwork {
    #[instrument(skip(self), fields(network = %self.name))]
    async fn xml_desc(&self) -> Result<String> {
        self.network
            .get_xml_desc(0)
            .map_err(|e| DriverError::Daemon(e.to_string()))
    }
}

#[async_trait]
impl NetworkUpdater for LibvirtNetwork {
    #[instrument(skip(self, xml), fields(network = %self.name))]
    async fn update(
        &self,
        command: UpdateCommand,
        section: UpdateSection,
        parent_index: i32,
        xml: &[u8],
        flags: UpdateFlags,
    ) -> Result<()> {
        // virt converts the fragment to a CString and panics on interior NUL.
        fragment::check_fragment(xml)?;

        let xml = std::str::from_utf8(xml)
            .map_err(|e| DriverError::Xml(format!("update fragment is not UTF-8: {}", e)))?;

        debug!(xml = %xml, "Updating network");

        self.network
            .update(
                command.as_raw() as sys::virNetworkUpdateCommand,
                section.as_raw() as sys::virNetworkUpdateSection,
                parent_index,
                xml,
                flags.bits() as sys::virNetworkUpdateFlags,
            )
            .map_err(|e| DriverError::Daemon(e.to_string()))
    }
}

/// A libvirt domain (virtual machine).
pub struct LibvirtDomain {
    name: String,
    domain: Domain,
}

impl LibvirtDomain {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl DescriptorSource for LibvirtDomain {
    #[instrument(skip(self), fields(domain = %self.name))]
    async fn xml_desc(&self) -> Result<String> {
        self.domain
            .get_xml_desc(0)
            .map_err(|e| DriverError::Daemon(e.to_string()))
    }
}

/// A libvirt storage pool.
pub struct LibvirtPool {
    name: String,
    pool: StoragePool,
}

impl LibvirtPool {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl DescriptorSource for LibvirtPool {
    #[instrument(skip(self), fields(pool = %self.name))]
    async fn xml_desc(&self) -> Result<String> {
        self.pool
            .get_xml_desc(0)
            .map_err(|e| DriverError::Daemon(e.to_string()))
    }
}
