//! In-memory daemon objects for testing and development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{DriverError, Result};
use crate::traits::{DescriptorSource, NetworkUpdater};
use crate::types::{NetworkUpdate, UpdateCommand, UpdateFlags, UpdateSection};

/// Mock network, domain or storage pool.
///
/// Serves a fixed XML descriptor and records every update call instead of
/// applying it. Failures can be injected to exercise error propagation:
/// - Unit and integration testing
/// - Development without libvirt installed
pub struct MockObject {
    xml: RwLock<String>,
    fetches: AtomicUsize,
    updates: RwLock<Vec<NetworkUpdate>>,
    fetch_error: Option<String>,
    update_error: Option<String>,
}

impl MockObject {
    /// Create a mock serving `xml`.
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            xml: RwLock::new(xml.into()),
            fetches: AtomicUsize::new(0),
            updates: RwLock::new(Vec::new()),
            fetch_error: None,
            update_error: None,
        }
    }

    /// Create a mock with an empty descriptor, for update-only tests.
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Make every fetch fail with a daemon error.
    pub fn with_fetch_error(mut self, message: impl Into<String>) -> Self {
        self.fetch_error = Some(message.into());
        self
    }

    /// Make every update fail with a daemon error. Failed updates are still recorded.
    pub fn with_update_error(mut self, message: impl Into<String>) -> Self {
        self.update_error = Some(message.into());
        self
    }

    /// Replace the served descriptor.
    pub fn set_xml(&self, xml: impl Into<String>) -> Result<()> {
        let mut current = self.xml.write().map_err(|_| {
            DriverError::Internal("Lock poisoned".to_string())
        })?;
        *current = xml.into();
        Ok(())
    }

    /// Number of descriptor fetches so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// All update calls, in call order.
    pub fn updates(&self) -> Result<Vec<NetworkUpdate>> {
        let updates = self.updates.read().map_err(|_| {
            DriverError::Internal("Lock poisoned".to_string())
        })?;
        Ok(updates.clone())
    }

    /// The most recent update call.
    pub fn last_update(&self) -> Result<Option<NetworkUpdate>> {
        Ok(self.updates()?.pop())
    }
}

impl Default for MockObject {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl DescriptorSource for MockObject {
    async fn xml_desc(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.fetch_error {
            return Err(DriverError::Daemon(message.clone()));
        }

        let xml = self.xml.read().map_err(|_| {
            DriverError::Internal("Lock poisoned".to_string())
        })?;
        Ok(xml.clone())
    }
}

#[async_trait]
impl NetworkUpdater for MockObject {
    #[instrument(skip(self, xml))]
    async fn update(
        &self,
        command: UpdateCommand,
        section: UpdateSection,
        parent_index: i32,
        xml: &[u8],
        flags: UpdateFlags,
    ) -> Result<()> {
        debug!("Recording mock network update");

        {
            let mut updates = self.updates.write().map_err(|_| {
                DriverError::Internal("Lock poisoned".to_string())
            })?;
            updates.push(NetworkUpdate {
                command,
                section,
                parent_index,
                xml: xml.to_vec(),
                flags,
            });
        }

        match &self.update_error {
            Some(message) => Err(DriverError::Daemon(message.clone())),
            None => Ok(()),
        }
    }
}
