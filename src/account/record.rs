//! Persisted wallet record.
//!
//! The seed is never stored: the record carries the derived private key and
//! everything else needed to rebuild an [`AccountState`] without remote calls.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::state::{standard_fee, AccountState};
use super::types::NormalizedTx;
use crate::address::same_address;
use crate::crypto::{parse_private_key, KeyPair};
use crate::error::{Result, WalletError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub network_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub confirmed_balance: Decimal,
    pub history_txs: Vec<NormalizedTx>,
    /// Equals the nonce.
    pub txs_count: u64,
    /// 0x-prefixed hex.
    pub private_key: String,
    /// 0x-prefixed hex.
    pub address_string: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub gas_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub gas_limit: Decimal,
    pub min_conf: u64,
}

impl WalletRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .map_err(|e| WalletError::Serialization(format!("writing {}: {}", path.display(), e)))?;
        info!("Wallet saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| WalletError::Serialization(format!("reading {}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }
}

impl AccountState {
    pub fn serialize(&self) -> WalletRecord {
        WalletRecord {
            network_id: self.network_id.clone(),
            balance: self.balance,
            confirmed_balance: self.confirmed_balance,
            history_txs: self.history.clone(),
            txs_count: self.nonce,
            private_key: format!("0x{}", self.keys.private_key_hex()),
            address_string: self.address().to_string(),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            min_conf: self.min_conf,
        }
    }

    /// Rebuild a wallet from a record. Keys come from the stored private key;
    /// a record whose address does not match that key is rejected.
    pub fn deserialize(record: WalletRecord) -> Result<Self> {
        let key = parse_private_key(&record.private_key)?;
        let keys = KeyPair::from_private_key(&key)?;
        if !same_address(keys.address(), &record.address_string) {
            return Err(WalletError::InvalidArgument(format!(
                "record address {} does not match its private key ({})",
                record.address_string,
                keys.address()
            )));
        }

        standard_fee(record.gas_limit, record.gas_price)?;
        for tx in &record.history_txs {
            tx.max_fee()?;
        }

        Ok(AccountState {
            network_id: record.network_id,
            keys,
            balance: record.balance,
            confirmed_balance: record.confirmed_balance,
            nonce: record.txs_count,
            gas_price: record.gas_price,
            gas_limit: record.gas_limit,
            min_conf: record.min_conf,
            history: record.history_txs,
        })
    }
}
