//! Driver configuration.

use serde::Deserialize;
use std::path::Path;

use crate::error::{DriverError, Result};

/// Default libvirt connection URI.
pub const DEFAULT_URI: &str = "qemu:///system";

/// Default network and storage pool name.
pub const DEFAULT_OBJECT: &str = "default";

/// Which daemon to talk to and which objects to use when none is named.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Libvirt connection URI (e.g. `qemu:///system`, `qemu+ssh://host/system`)
    pub uri: String,
    /// Network used for DHCP/DNS host records
    pub network: String,
    /// Storage pool holding instance images
    pub pool: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            network: DEFAULT_OBJECT.to_string(),
            pool: DEFAULT_OBJECT.to_string(),
        }
    }
}

impl DriverConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: DriverConfig = serde_yaml::from_str(yaml)
            .map_err(|e| DriverError::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty names.
    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            return Err(DriverError::InvalidConfig("network name is empty".to_string()));
        }
        if self.pool.trim().is_empty() {
            return Err(DriverError::InvalidConfig("pool name is empty".to_string()));
        }
        Ok(())
    }
}
