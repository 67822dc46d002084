//! Type definitions shared by the resolvers, enumerators and mutators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

// =============================================================================
// Descriptor entries
// =============================================================================

/// A static DHCP reservation (`<ip><dhcp><host .../>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpHostEntry {
    /// MAC address the reservation is bound to
    pub mac: String,
    /// Optional hostname handed out with the lease
    pub name: Option<String>,
    /// Reserved IP address
    pub ip: String,
}

/// A static DNS host record (`<dns><host ip><hostname>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsHostEntry {
    pub ip: String,
    /// Hostname label
    pub name: String,
}

/// A domain interface's MAC address and the network it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacNetworkBinding {
    pub mac: String,
    pub network: String,
}

// =============================================================================
// Storage pools
// =============================================================================

/// Libvirt storage pool type (the `type` attribute of `<pool>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    /// Directory on the local filesystem
    Dir,
    /// Pre-formatted block device mounted locally
    Fs,
    /// Network filesystem (NFS, CIFS, GlusterFS mount)
    Netfs,
    /// LVM volume group
    Logical,
    /// Physical disk partitions
    Disk,
    /// iSCSI target
    Iscsi,
    /// Ceph RBD
    Rbd,
    /// Any type this crate does not know about
    Other(String),
}

impl PoolType {
    /// Parse the libvirt type string.
    pub fn from_str(s: &str) -> Self {
        match s {
            "dir" => PoolType::Dir,
            "fs" => PoolType::Fs,
            "netfs" => PoolType::Netfs,
            "logical" => PoolType::Logical,
            "disk" => PoolType::Disk,
            "iscsi" => PoolType::Iscsi,
            "rbd" => PoolType::Rbd,
            other => PoolType::Other(other.to_string()),
        }
    }

    /// The libvirt type string.
    pub fn as_str(&self) -> &str {
        match self {
            PoolType::Dir => "dir",
            PoolType::Fs => "fs",
            PoolType::Netfs => "netfs",
            PoolType::Logical => "logical",
            PoolType::Disk => "disk",
            PoolType::Iscsi => "iscsi",
            PoolType::Rbd => "rbd",
            PoolType::Other(s) => s,
        }
    }

    /// Whether `target/path` names a directory images can be written to.
    ///
    /// Only directory pools qualify; block-backed and mounted types are
    /// rejected until they are deliberately supported.
    pub fn is_path_bearing(&self) -> bool {
        matches!(self, PoolType::Dir)
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Network update call
// =============================================================================

/// `virNetworkUpdateCommand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum UpdateCommand {
    Modify = 1,
    Delete = 2,
    AddLast = 3,
}

impl UpdateCommand {
    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// `virNetworkUpdateSection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum UpdateSection {
    IpDhcpHost = 4,
    DnsHost = 10,
}

impl UpdateSection {
    pub fn as_raw(self) -> u32 {
        self as u32
    }
}

/// `virNetworkUpdateFlags` bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UpdateFlags(u32);

impl UpdateFlags {
    /// Apply to the running network.
    pub const AFFECT_LIVE: UpdateFlags = UpdateFlags(1);
    /// Apply to the persistent definition.
    pub const AFFECT_CONFIG: UpdateFlags = UpdateFlags(2);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: UpdateFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for UpdateFlags {
    type Output = UpdateFlags;

    fn bitor(self, rhs: UpdateFlags) -> UpdateFlags {
        UpdateFlags(self.0 | rhs.0)
    }
}

/// Flags used for every host mutation: immediate and persisted.
pub const HOST_UPDATE_FLAGS: UpdateFlags = UpdateFlags(UpdateFlags::AFFECT_LIVE.0 | UpdateFlags::AFFECT_CONFIG.0);

/// Parent index for host sections. Only the first `<ip>` block is addressed.
pub const HOST_PARENT_INDEX: i32 = 0;

/// The five arguments of a network update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUpdate {
    pub command: UpdateCommand,
    pub section: UpdateSection,
    pub parent_index: i32,
    pub xml: Vec<u8>,
    pub flags: UpdateFlags,
}

impl NetworkUpdate {
    /// Raw tuple as passed to `virNetworkUpdate`.
    pub fn as_raw(&self) -> (u32, u32, i32, &[u8], u32) {
        (
            self.command.as_raw(),
            self.section.as_raw(),
            self.parent_index,
            &self.xml,
            self.flags.bits(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_constants_match_libvirt() {
        assert_eq!(UpdateCommand::Modify.as_raw(), 1);
        assert_eq!(UpdateCommand::Delete.as_raw(), 2);
        assert_eq!(UpdateCommand::AddLast.as_raw(), 3);
        assert_eq!(UpdateSection::IpDhcpHost.as_raw(), 4);
        assert_eq!(UpdateSection::DnsHost.as_raw(), 10);
        assert_eq!(HOST_UPDATE_FLAGS.bits(), 3);
        assert_eq!(HOST_UPDATE_FLAGS, UpdateFlags::AFFECT_LIVE | UpdateFlags::AFFECT_CONFIG);
        assert!(HOST_UPDATE_FLAGS.contains(UpdateFlags::AFFECT_CONFIG));
    }

    #[test]
    fn test_pool_type_roundtrip_and_path_bearing() {
        assert_eq!(PoolType::from_str("dir"), PoolType::Dir);
        assert_eq!(PoolType::from_str("iscsi"), PoolType::Iscsi);
        assert_eq!(PoolType::from_str("gluster"), PoolType::Other("gluster".to_string()));
        assert_eq!(PoolType::Other("zfs".to_string()).to_string(), "zfs");

        assert!(PoolType::Dir.is_path_bearing());
        assert!(!PoolType::Iscsi.is_path_bearing());
        assert!(!PoolType::Netfs.is_path_bearing());
    }
}
