//! EVM ledger backend
//!
//! Talks to the MemoryStorage contract: `storeMemory` is payable with a
//! fixed fee in the network's native unit, the getters are free view calls.
//! Balance is checked before sending so an underfunded wallet fails with
//! `InsufficientFunds` instead of a raw RPC revert.

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::{LedgerClient, LedgerError, RecordReceipt};
use crate::config::LedgerConfig;

abigen!(
    MemoryStorage,
    r#"[
        function storeMemory(string _cid) payable
        function getUserMemories(address _user) view returns (string[])
        function getUserMemoryCount(address _user) view returns (uint256)
        function getMemoryPrice() pure returns (uint256)
        function hasMemories(address _user) view returns (bool)
    ]"#
);

pub struct EvmLedger {
    contract_address: Address,
    record_fee: U256,
    provider: Arc<Provider<Http>>,
    signer: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

impl EvmLedger {
    /// Create a ledger client for one chain and one signing wallet
    pub fn new(config: &LedgerConfig, signer_private_key: &str) -> Result<Self, LedgerError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| LedgerError::Network(format!("invalid RPC url: {}", e)))?;
        let provider = Arc::new(provider);

        let wallet = signer_private_key
            .parse::<LocalWallet>()
            .map_err(|e| LedgerError::Contract(format!("invalid private key: {}", e)))?
            .with_chain_id(config.chain_id);

        let signer = Arc::new(SignerMiddleware::new(provider.as_ref().clone(), wallet));

        let contract_address = Address::from_str(&config.contract_address)
            .map_err(|e| LedgerError::Contract(format!("invalid contract address: {}", e)))?;

        info!(
            "Ledger client ready for contract {} on chain {}",
            config.contract_address, config.chain_id
        );

        Ok(Self {
            contract_address,
            record_fee: U256::from(config.record_fee_units),
            provider,
            signer,
        })
    }

    fn map_send_error(e: impl std::fmt::Display) -> LedgerError {
        let msg = e.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("insufficient funds") {
            LedgerError::InsufficientFunds
        } else if lower.contains("user rejected") || lower.contains("user denied") {
            LedgerError::UserRejected
        } else {
            LedgerError::Contract(msg)
        }
    }

    /// Current record fee as a human-readable amount (6-decimal native unit)
    ///
    /// Falls back to the configured fee when the contract query fails.
    pub async fn memory_price(&self) -> String {
        let contract = MemoryStorage::new(self.contract_address, self.provider.clone());
        let units = match contract.get_memory_price().call().await {
            Ok(price) => price,
            Err(e) => {
                debug!("memory price query failed, using configured fee: {}", e);
                self.record_fee
            }
        };
        format!("{:.2}", units.as_u128() as f64 / 1_000_000.0)
    }

    /// Whether an address has any recorded memories; false on query failure
    pub async fn has_memories(&self, address: &str) -> bool {
        let Ok(user) = Address::from_str(address) else {
            return false;
        };
        let contract = MemoryStorage::new(self.contract_address, self.provider.clone());
        contract.has_memories(user).call().await.unwrap_or(false)
    }
}

#[async_trait]
impl LedgerClient for EvmLedger {
    async fn record(&self, cid: &str) -> Result<RecordReceipt, LedgerError> {
        let balance = self
            .provider
            .get_balance(self.signer.address(), None)
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;
        if balance < self.record_fee {
            return Err(LedgerError::InsufficientFunds);
        }

        let contract = MemoryStorage::new(self.contract_address, self.signer.clone());
        let call = contract.store_memory(cid.to_string()).value(self.record_fee);

        let pending = call.send().await.map_err(Self::map_send_error)?;
        let tx_hash = pending.tx_hash();
        info!("Record transaction sent: {:?}", tx_hash);

        let receipt = pending
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?
            .ok_or_else(|| {
                LedgerError::Contract("record transaction dropped without receipt".to_string())
            })?;

        info!(
            "Record confirmed at block {}",
            receipt.block_number.unwrap_or_default()
        );

        Ok(RecordReceipt {
            tx_hash: format!("{:?}", tx_hash),
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }

    async fn list_cids(&self, address: &str) -> Result<Vec<String>, LedgerError> {
        let user = Address::from_str(address)
            .map_err(|e| LedgerError::Contract(format!("invalid address: {}", e)))?;

        let contract = MemoryStorage::new(self.contract_address, self.provider.clone());
        contract
            .get_user_memories(user)
            .call()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))
    }

    async fn count(&self, address: &str) -> u64 {
        let Ok(user) = Address::from_str(address) else {
            return 0;
        };

        let contract = MemoryStorage::new(self.contract_address, self.provider.clone());
        match contract.get_user_memory_count(user).call().await {
            Ok(n) => n.as_u64(),
            Err(e) => {
                debug!("memory count query failed: {}", e);
                0
            }
        }
    }
}
