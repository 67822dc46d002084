//! Storage pool descriptors.

use tracing::{debug, instrument};

use crate::error::{DriverError, Result};
use crate::traits::DescriptorSource;
use crate::types::PoolType;
use crate::xml::Element;

/// Parsed `<pool>` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDescriptor {
    pub pool_type: PoolType,
    /// Text of `target/path`
    pub target_path: Option<String>,
}

impl PoolDescriptor {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse_root(xml, "pool")?;

        Ok(Self {
            pool_type: PoolType::from_str(root.attr("type").unwrap_or_default()),
            target_path: root
                .child("target")
                .and_then(|target| target.child("path"))
                .map(|path| path.text().to_string())
                .filter(|path| !path.is_empty()),
        })
    }

    /// Local directory backing the pool.
    ///
    /// Fails with [`DriverError::PathNotFound`] for pool types without a
    /// usable filesystem path, even when they carry a `target/path`.
    pub fn path(&self) -> Result<&str> {
        if !self.pool_type.is_path_bearing() {
            return Err(DriverError::PathNotFound(format!(
                "pool type '{}' has no local path",
                self.pool_type
            )));
        }

        self.target_path
            .as_deref()
            .ok_or_else(|| DriverError::PathNotFound("pool has no target path".to_string()))
    }
}

/// Fetch and parse a pool's descriptor.
pub async fn fetch_pool<P: DescriptorSource + ?Sized>(pool: &P) -> Result<PoolDescriptor> {
    let xml = pool.xml_desc().await?;
    debug!(xml = %xml, "Fetched storage pool XML");
    PoolDescriptor::parse(&xml)
}

/// Filesystem path of a directory pool.
#[instrument(skip(pool))]
pub async fn pool_path<P: DescriptorSource + ?Sized>(pool: &P) -> Result<String> {
    let descriptor = fetch_pool(pool).await?;
    descriptor.path().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockObject;
    use std::io;

    const POOLXML_PATH_DIR: &str = r#"<pool type='dir'>
  <target>
    <path>/var/lib/libvirt/images</path>
  </target>
</pool>
"#;

    const POOLXML_PATH_ISCSI: &str = r#"<pool type='iscsi'>
  <target>
    <path>/var/lib/libvirt/images</path>
  </target>
</pool>
"#;

    #[tokio::test]
    async fn test_pool_path_dir() {
        let pool = MockObject::new(POOLXML_PATH_DIR);
        let path = pool_path(&pool).await.unwrap();
        assert_eq!(path, "/var/lib/libvirt/images");
        assert_eq!(pool.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_pool_path_iscsi() {
        let pool = MockObject::new(POOLXML_PATH_ISCSI);
        let err = pool_path(&pool).await.unwrap_err();
        assert!(matches!(err, DriverError::PathNotFound(_)));

        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_dir_pool_without_target_path() {
        let descriptor = PoolDescriptor::parse("<pool type='dir'><target/></pool>").unwrap();
        assert!(descriptor.path().unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_pool_type() {
        let descriptor = PoolDescriptor::parse(POOLXML_PATH_DIR.replace("'dir'", "'zfs'").as_str())
            .unwrap();
        assert_eq!(descriptor.pool_type, PoolType::Other("zfs".to_string()));
        assert!(descriptor.path().is_err());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let pool = MockObject::new(POOLXML_PATH_DIR).with_fetch_error("pool not found");
        let err = pool_path(&pool).await.unwrap_err();
        assert!(matches!(err, DriverError::Daemon(_)));
    }
}
