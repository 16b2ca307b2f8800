//! Derived-Key Session Cache
//!
//! Keeps wallet-derived keys in memory for the life of an authenticated
//! session so the user is not forced to re-sign on every operation. Keys are
//! stored per wallet address, never persisted to disk, and cleared on
//! explicit disconnect.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::crypto::MemoryKey;

/// In-memory, volatile cache of derived encryption keys
#[derive(Clone, Default)]
pub struct KeyCache {
    keys: Arc<RwLock<HashMap<String, MemoryKey>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a derived key for a wallet address
    pub async fn store(&self, address: &str, key: MemoryKey) {
        let mut keys = self.keys.write().await;
        keys.insert(address.to_string(), key);
        tracing::debug!("Cached encryption key for {} (cached: {})", address, keys.len());
    }

    /// Retrieve a cached key, if the session still holds one
    pub async fn get(&self, address: &str) -> Option<MemoryKey> {
        let keys = self.keys.read().await;
        keys.get(address).cloned()
    }

    /// Drop the key for one address; call on wallet disconnect
    pub async fn clear(&self, address: &str) {
        let mut keys = self.keys.write().await;
        if keys.remove(address).is_some() {
            tracing::debug!("Cleared encryption key for {}", address);
        }
    }

    /// Drop every cached key
    pub async fn clear_all(&self) {
        let mut keys = self.keys.write().await;
        keys.clear();
    }

    pub async fn len(&self) -> usize {
        let keys = self.keys.read().await;
        keys.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
