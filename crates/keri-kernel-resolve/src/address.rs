//! Mapping from identifier prefixes to network locations.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use keri_kernel_core::Prefix;

use crate::error::{ResolveError, Result};
use crate::messages::NetworkLocation;

/// Finds where the controller of a prefix can be reached.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Location for `prefix`, or [`ResolveError::NotFound`].
    async fn resolve(&self, prefix: &Prefix) -> Result<NetworkLocation>;

    /// Publish `location` for `prefix`, replacing any earlier entry.
    async fn register(&self, prefix: Prefix, location: NetworkLocation) -> Result<()>;
}

/// An address book held in memory.
#[derive(Debug, Default)]
pub struct MemoryAddressBook {
    entries: RwLock<HashMap<Prefix, NetworkLocation>>,
}

impl MemoryAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn forget(&self, prefix: &Prefix) -> Option<NetworkLocation> {
        self.entries.write().await.remove(prefix)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl AddressResolver for MemoryAddressBook {
    async fn resolve(&self, prefix: &Prefix) -> Result<NetworkLocation> {
        self.entries
            .read()
            .await
            .get(prefix)
            .cloned()
            .ok_or(ResolveError::NotFound(*prefix))
    }

    async fn register(&self, prefix: Prefix, location: NetworkLocation) -> Result<()> {
        self.entries.write().await.insert(prefix, location);
        Ok(())
    }
}
