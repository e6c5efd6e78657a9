//! In-memory [`ChainApi`] for tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::ChainApi;
use crate::account::types::{BalanceInfo, RawTx};
use crate::crypto::KeyPair;
use crate::error::{Result, WalletError};

#[derive(Default)]
pub struct MockApi {
    pub balances: Mutex<HashMap<String, BalanceInfo>>,
    pub tx_counts: Mutex<HashMap<String, u64>>,
    pub gas_price: Mutex<Decimal>,
    pub histories: Mutex<HashMap<String, Vec<RawTx>>>,
    /// Transactions served by `get_tx`, keyed by id.
    pub txs: Mutex<HashMap<String, RawTx>>,
    pub broadcasts: Mutex<Vec<String>>,
    /// Id returned by the next successful broadcast.
    pub next_tx_id: Mutex<String>,
    /// Method names that should fail.
    pub failing: Mutex<HashSet<&'static str>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockApi {
    pub fn new() -> Self {
        let api = Self::default();
        *api.gas_price.lock().unwrap() = Decimal::from(2);
        *api.next_tx_id.lock().unwrap() = "0xfeed".to_string();
        api
    }

    pub fn with_account(self, address: &str, balance: i64, confirmed: i64, tx_count: u64) -> Self {
        self.balances.lock().unwrap().insert(
            address.to_string(),
            BalanceInfo {
                balance: Decimal::from(balance),
                confirmed_balance: Decimal::from(confirmed),
            },
        );
        self.tx_counts.lock().unwrap().insert(address.to_string(), tx_count);
        self
    }

    pub fn with_history(self, address: &str, txs: Vec<RawTx>) -> Self {
        self.histories.lock().unwrap().insert(address.to_string(), txs);
        self
    }

    pub fn with_tx(self, tx: RawTx) -> Self {
        self.txs.lock().unwrap().insert(tx.hash.clone(), tx);
        self
    }

    pub fn fail(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|m| **m == method).count()
    }

    fn enter(&self, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(method);
        if self.failing.lock().unwrap().contains(method) {
            return Err(WalletError::Remote(format!("{} unavailable", method)));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainApi for MockApi {
    async fn get_balance(&self, address: &str, _min_conf: u64) -> Result<BalanceInfo> {
        self.enter("get_balance")?;
        Ok(self.balances.lock().unwrap().get(address).cloned().unwrap_or(BalanceInfo {
            balance: Decimal::ZERO,
            confirmed_balance: Decimal::ZERO,
        }))
    }

    async fn get_tx_count(&self, address: &str) -> Result<u64> {
        self.enter("get_tx_count")?;
        Ok(self.tx_counts.lock().unwrap().get(address).copied().unwrap_or(0))
    }

    async fn get_gas_price(&self) -> Result<Decimal> {
        self.enter("get_gas_price")?;
        Ok(*self.gas_price.lock().unwrap())
    }

    async fn get_tx_history(&self, address: &str) -> Result<Vec<RawTx>> {
        self.enter("get_tx_history")?;
        Ok(self.histories.lock().unwrap().get(address).cloned().unwrap_or_default())
    }

    async fn get_tx(&self, tx_id: &str, _address: &str) -> Result<RawTx> {
        self.enter("get_tx")?;
        self.txs
            .lock()
            .unwrap()
            .get(tx_id)
            .cloned()
            .ok_or_else(|| WalletError::Remote(format!("unknown transaction {}", tx_id)))
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String> {
        self.enter("broadcast")?;
        self.broadcasts.lock().unwrap().push(raw_tx_hex.to_string());
        Ok(self.next_tx_id.lock().unwrap().clone())
    }
}

pub const TEST_SEED: [u8; 32] = [7u8; 32];

/// Address derived from [`TEST_SEED`].
pub fn test_address() -> String {
    KeyPair::from_seed(&TEST_SEED).unwrap().address().to_string()
}

/// Raw transaction with the fields tests usually care about.
pub fn raw_tx(hash: &str, from: &str, to: &str, value: i64, confirmations: u64) -> RawTx {
    RawTx {
        hash: hash.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        value: Decimal::from(value),
        gas: Decimal::from(21000),
        gas_price: Decimal::from(1),
        gas_used: Some(Decimal::from(21000)),
        confirmations,
        block_number: None,
        timestamp: None,
    }
}
