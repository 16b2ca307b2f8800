//! In-memory ledger backend for tests
//!
//! Records go into the list of a single configured owner address, matching
//! the real backend where the signer determines whose entry is appended.
//! Supports error injection on both record and list, a configurable next
//! transaction hash, and a record call counter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{LedgerClient, LedgerError, RecordReceipt};

#[derive(Clone)]
pub struct MockLedger {
    owner: String,
    entries: Arc<Mutex<HashMap<String, Vec<String>>>>,
    injected_record_error: Arc<Mutex<Option<LedgerError>>>,
    injected_list_error: Arc<Mutex<Option<LedgerError>>>,
    next_tx_hash: Arc<Mutex<Option<String>>>,
    record_calls: Arc<AtomicUsize>,
}

impl MockLedger {
    /// Create a ledger whose record calls append to `owner`'s list
    pub fn for_address(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            entries: Arc::new(Mutex::new(HashMap::new())),
            injected_record_error: Arc::new(Mutex::new(None)),
            injected_list_error: Arc::new(Mutex::new(None)),
            next_tx_hash: Arc::new(Mutex::new(None)),
            record_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail the next record call with the given error
    pub async fn inject_record_error(&self, error: LedgerError) {
        let mut injected = self.injected_record_error.lock().await;
        *injected = Some(error);
    }

    /// Fail the next list call with the given error
    pub async fn inject_list_error(&self, error: LedgerError) {
        let mut injected = self.injected_list_error.lock().await;
        *injected = Some(error);
    }

    /// Fix the transaction hash returned by the next record call
    pub async fn set_next_tx_hash(&self, tx_hash: &str) {
        let mut next = self.next_tx_hash.lock().await;
        *next = Some(tx_hash.to_string());
    }

    /// Seed a CID directly into an address's list (tombstones included)
    pub async fn push_cid(&self, address: &str, cid: &str) {
        let mut entries = self.entries.lock().await;
        entries
            .entry(address.to_string())
            .or_default()
            .push(cid.to_string());
    }

    pub fn record_count(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn record(&self, cid: &str) -> Result<RecordReceipt, LedgerError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);

        let mut injected = self.injected_record_error.lock().await;
        if let Some(error) = injected.take() {
            return Err(error);
        }
        drop(injected);

        let mut entries = self.entries.lock().await;
        let list = entries.entry(self.owner.clone()).or_default();
        list.push(cid.to_string());
        let index = list.len();
        drop(entries);

        let mut next = self.next_tx_hash.lock().await;
        let tx_hash = next
            .take()
            .unwrap_or_else(|| format!("0x{:064x}", index));

        Ok(RecordReceipt {
            tx_hash,
            block_number: Some(index as u64),
        })
    }

    async fn list_cids(&self, address: &str) -> Result<Vec<String>, LedgerError> {
        let mut injected = self.injected_list_error.lock().await;
        if let Some(error) = injected.take() {
            return Err(error);
        }
        drop(injected);

        let entries = self.entries.lock().await;
        Ok(entries.get(address).cloned().unwrap_or_default())
    }

    async fn count(&self, address: &str) -> u64 {
        let entries = self.entries.lock().await;
        entries.get(address).map(|list| list.len() as u64).unwrap_or(0)
    }
}
