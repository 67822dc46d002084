//! Error types for the libvirt descriptor driver.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading descriptors or applying updates.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Failed to connect to the daemon.
    #[error("Failed to connect to libvirt: {0}")]
    ConnectionFailed(String),

    /// A named network, domain or pool does not exist.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// The pool has no local filesystem path (unsupported pool type).
    #[error("Path not found for pool: {0}")]
    PathNotFound(String),

    /// Failure reported by the daemon on fetch or update.
    #[error("Libvirt error: {0}")]
    Daemon(String),

    /// Descriptor could not be parsed.
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DriverError {
    /// The `std::io` kind this error maps to.
    ///
    /// `PathNotFound` is the ENOENT equivalent callers match on.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            DriverError::PathNotFound(_) | DriverError::ObjectNotFound(_) => io::ErrorKind::NotFound,
            DriverError::Xml(_) | DriverError::InvalidConfig(_) => io::ErrorKind::InvalidData,
            _ => io::ErrorKind::Other,
        }
    }

    /// True for the NotFound kind.
    pub fn is_not_found(&self) -> bool {
        self.io_kind() == io::ErrorKind::NotFound
    }
}

impl From<DriverError> for io::Error {
    fn from(err: DriverError) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}

impl From<quick_xml::Error> for DriverError {
    fn from(err: quick_xml::Error) -> Self {
        DriverError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DriverError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DriverError::Xml(err.to_string())
    }
}

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
