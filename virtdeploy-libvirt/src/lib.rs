//! # virtdeploy libvirt driver
//!
//! Reads and rewrites the XML descriptors a libvirt daemon exposes for
//! networks, domains and storage pools:
//!
//! - **Networks**: DNS domain name, static DHCP reservations and DNS host
//!   records (enumerate, add, delete), next free address
//! - **Domains**: interface MAC / network bindings, disk images
//! - **Storage pools**: filesystem path of directory pools
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  network / domain / storage operations       │
//! │  (fetch → parse → extract, or fragment →     │
//! │   update)                                    │
//! └──────────────────────┬───────────────────────┘
//!                        │ DescriptorSource / NetworkUpdater
//!          ┌─────────────┴─────────────┐
//!          ▼                           ▼
//! ┌───────────────────┐       ┌───────────────────┐
//! │  LibvirtNetwork,  │       │    MockObject     │
//! │  Domain, Pool     │       │   (in memory)     │
//! └───────────────────┘       └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use virtdeploy_libvirt::{network, DriverConfig, LibvirtDriver};
//!
//! #[tokio::main]
//! async fn main() -> virtdeploy_libvirt::Result<()> {
//!     let driver = LibvirtDriver::connect(&DriverConfig::default()).await?;
//!     let net = driver.default_network()?;
//!
//!     let ip = network::next_free_address(&net, &[]).await?.expect("subnet full");
//!     network::add_dhcp_host(&net, "vm-1", "52:54:00:a1:b2:01", &ip.to_string()).await?;
//!     network::add_dns_host(&net, "vm-1", &ip.to_string()).await?;
//!     Ok(())
//! }
//! ```
//!
//! Concurrent read-then-mutate sequences on one network can race; see
//! [`MutationLocks`].

pub mod config;
pub mod domain;
pub mod error;
pub mod fragment;
pub mod libvirt;
pub mod lock;
pub mod mock;
pub mod network;
pub mod storage;
pub mod traits;
pub mod types;
mod xml;

pub use config::DriverConfig;
pub use domain::DomainDescriptor;
pub use error::{DriverError, Result};
pub use lock::{MutationGuard, MutationLocks, ObjectKind};
pub use mock::MockObject;
pub use network::{IpBlock, NetworkDescriptor};
pub use storage::PoolDescriptor;
pub use traits::{DescriptorSource, NetworkHandle, NetworkUpdater};
pub use types::*;

// Re-export libvirt backend when available
#[cfg(feature = "libvirt")]
pub use libvirt::{LibvirtDomain, LibvirtDriver, LibvirtNetwork, LibvirtPool};
