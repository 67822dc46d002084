//! Libvirt daemon backend.
//!
//! Wraps `virt` handles so they implement the capability traits. Requires the
//! `libvirt` feature and a system libvirt installation.

#[cfg(feature = "libvirt")]
mod backend;

#[cfg(feature = "libvirt")]
pub use backend::{LibvirtDomain, LibvirtDriver, LibvirtNetwork, LibvirtPool};

/// Check if libvirt backend is compiled in.
pub fn is_available() -> bool {
    cfg!(feature = "libvirt")
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_availability_follows_feature() {
        assert_eq!(super::is_available(), cfg!(feature = "libvirt"));
    }
}
