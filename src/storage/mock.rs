//! In-memory storage backend for tests
//!
//! Content-addressed like the real service: the CID is derived from the
//! envelope bytes, so identical envelopes pin to the same identifier.
//! Supports one-shot error injection, per-CID fetch failures, and call
//! counters for short-circuit assertions.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{StorageClient, StorageError};
use crate::envelope::EncryptedEnvelope;

#[derive(Clone, Default)]
pub struct MockStorage {
    entries: Arc<Mutex<HashMap<String, EncryptedEnvelope>>>,
    injected_error: Arc<Mutex<Option<StorageError>>>,
    failing_cids: Arc<Mutex<HashSet<String>>>,
    pin_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_cid(envelope: &EncryptedEnvelope) -> String {
        let mut hasher = Sha256::new();
        hasher.update(envelope.to_bytes().unwrap_or_default());
        let hash = hex::encode(hasher.finalize());
        format!("Qm{}", &hash[..40])
    }

    /// Fail the next pin or fetch call with the given error
    pub async fn inject_error(&self, error: StorageError) {
        let mut injected = self.injected_error.lock().await;
        *injected = Some(error);
    }

    /// Make every fetch of this CID fail with `Unavailable`
    pub async fn fail_fetches_of(&self, cid: &str) {
        let mut failing = self.failing_cids.lock().await;
        failing.insert(cid.to_string());
    }

    /// Seed an envelope directly, returning its CID
    pub async fn insert(&self, envelope: EncryptedEnvelope) -> String {
        let cid = Self::generate_cid(&envelope);
        let mut entries = self.entries.lock().await;
        entries.insert(cid.clone(), envelope);
        cid
    }

    pub fn pin_count(&self) -> usize {
        self.pin_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    async fn take_injected_error(&self) -> Result<(), StorageError> {
        let mut injected = self.injected_error.lock().await;
        if let Some(error) = injected.take() {
            return Err(error);
        }
        Ok(())
    }
}

#[async_trait]
impl StorageClient for MockStorage {
    async fn pin(&self, envelope: &EncryptedEnvelope) -> Result<String, StorageError> {
        self.pin_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected_error().await?;

        let cid = Self::generate_cid(envelope);
        let mut entries = self.entries.lock().await;
        entries.insert(cid.clone(), envelope.clone());
        Ok(cid)
    }

    async fn fetch(&self, cid: &str) -> Result<EncryptedEnvelope, StorageError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.take_injected_error().await?;

        let failing = self.failing_cids.lock().await;
        if failing.contains(cid) {
            return Err(StorageError::Unavailable(format!(
                "injected fetch failure for {}",
                cid
            )));
        }
        drop(failing);

        let entries = self.entries.lock().await;
        entries
            .get(cid)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(cid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_envelope() -> EncryptedEnvelope {
        EncryptedEnvelope::seal(b"ciphertext", &[1u8; 12], "0xabc")
    }

    #[tokio::test]
    async fn test_pin_then_fetch() {
        let storage = MockStorage::new();
        let envelope = sample_envelope();

        let cid = storage.pin(&envelope).await.unwrap();
        assert!(cid.starts_with("Qm"));

        let fetched = storage.fetch(&cid).await.unwrap();
        assert_eq!(fetched, envelope);
    }

    #[tokio::test]
    async fn test_content_addressing_is_deterministic() {
        let storage = MockStorage::new();
        let envelope = sample_envelope();

        let a = storage.pin(&envelope).await.unwrap();
        let b = storage.pin(&envelope).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_fetch_unknown_cid_is_not_found() {
        let storage = MockStorage::new();
        let result = storage.fetch("QmUnknown").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_injected_error_fires_once() {
        let storage = MockStorage::new();
        storage
            .inject_error(StorageError::Unavailable("down".to_string()))
            .await;

        let envelope = sample_envelope();
        assert!(storage.pin(&envelope).await.is_err());
        assert!(storage.pin(&envelope).await.is_ok());
    }

    #[tokio::test]
    async fn test_call_counters() {
        let storage = MockStorage::new();
        let envelope = sample_envelope();

        let cid = storage.pin(&envelope).await.unwrap();
        let _ = storage.fetch(&cid).await;
        let _ = storage.fetch(&cid).await;

        assert_eq!(storage.pin_count(), 1);
        assert_eq!(storage.fetch_count(), 2);
    }
}
