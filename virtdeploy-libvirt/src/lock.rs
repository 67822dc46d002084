//! Opt-in serialization of mutations per daemon object.
//!
//! The daemon serializes individual update calls, but two callers that each
//! read a network and then mutate it can interleave. Nothing in this crate
//! takes these locks implicitly; callers hold a guard across their own
//! read-modify-write sequence.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{DriverError, Result};

/// Kind of daemon object a lock refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Network,
    Domain,
    Pool,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Network => f.write_str("network"),
            ObjectKind::Domain => f.write_str("domain"),
            ObjectKind::Pool => f.write_str("pool"),
        }
    }
}

/// Registry of per-object async mutexes.
#[derive(Default)]
pub struct MutationLocks {
    locks: Mutex<HashMap<(ObjectKind, String), Arc<AsyncMutex<()>>>>,
}

/// Held while a caller mutates one object.
pub type MutationGuard = OwnedMutexGuard<()>;

impl MutationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the object `name` of kind `kind`.
    pub async fn lock(&self, kind: ObjectKind, name: &str) -> Result<MutationGuard> {
        let mutex = {
            let mut locks = self.locks.lock().map_err(|_| {
                DriverError::Internal("Lock poisoned".to_string())
            })?;
            locks
                .entry((kind, name.to_string()))
                .or_default()
                .clone()
        };

        debug!(kind = %kind, name = %name, "Waiting for mutation lock");
        Ok(mutex.lock_owned().await)
    }

    /// Shorthand for `lock(ObjectKind::Network, name)`.
    pub async fn lock_network(&self, name: &str) -> Result<MutationGuard> {
        self.lock(ObjectKind::Network, name).await
    }

    /// Drop registry entries nobody holds or waits on.
    pub fn prune(&self) -> Result<usize> {
        let mut locks = self.locks.lock().map_err(|_| {
            DriverError::Internal("Lock poisoned".to_string())
        })?;
        let before = locks.len();
        locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        Ok(before - locks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_object_is_serialized() {
        let locks = Arc::new(MutationLocks::new());
        let guard = locks.lock_network("default").await.unwrap();

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock_network("default").await.unwrap();
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_objects_do_not_block() {
        let locks = MutationLocks::new();
        let _net = locks.lock(ObjectKind::Network, "default").await.unwrap();
        let _other = locks.lock(ObjectKind::Network, "othernet1").await.unwrap();
        let _pool = locks.lock(ObjectKind::Pool, "default").await.unwrap();
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let locks = MutationLocks::new();
        let held = locks.lock_network("default").await.unwrap();
        drop(locks.lock_network("othernet1").await.unwrap());

        assert_eq!(locks.prune().unwrap(), 1);
        drop(held);
        assert_eq!(locks.prune().unwrap(), 1);
    }
}
