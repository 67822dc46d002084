//! Capability traits over daemon objects.
//!
//! Resolvers, enumerators and mutators are written against these traits so
//! that the libvirt backend and the in-memory mocks are interchangeable.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{UpdateCommand, UpdateFlags, UpdateSection};

/// An object (network, domain or storage pool) whose XML descriptor can be fetched.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Fetch the current XML descriptor.
    ///
    /// One round trip to the daemon per call; nothing is cached.
    async fn xml_desc(&self) -> Result<String>;
}

/// A network that accepts incremental updates.
///
/// Mirrors `virNetworkUpdate`: the daemon applies `xml` to `section` of the
/// network, using `parent_index` to pick the parent element (e.g. which `<ip>`).
#[async_trait]
pub trait NetworkUpdater: Send + Sync {
    /// Apply one update. Daemon failures are returned unchanged.
    async fn update(
        &self,
        command: UpdateCommand,
        section: UpdateSection,
        parent_index: i32,
        xml: &[u8],
        flags: UpdateFlags,
    ) -> Result<()>;
}

/// A network that can be both read and updated.
pub trait NetworkHandle: DescriptorSource + NetworkUpdater {}

impl<T: DescriptorSource + NetworkUpdater + ?Sized> NetworkHandle for T {}
