//! Transaction and balance shapes shared by the account state and the API client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// Balance pair returned by the indexer for one address.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceInfo {
    pub balance: Decimal,
    pub confirmed_balance: Decimal,
}

/// Transaction as reported by the indexer, before normalization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTx {
    pub hash: String,
    pub from: String,
    /// Empty for contract creation.
    #[serde(default)]
    pub to: String,
    pub value: Decimal,
    pub gas: Decimal,
    pub gas_price: Decimal,
    #[serde(default)]
    pub gas_used: Option<Decimal>,
    #[serde(default)]
    pub confirmations: u64,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// History entry as seen from this wallet: outflows carry a negative value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTx {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: Decimal,
    pub gas: Decimal,
    pub gas_price: Decimal,
    #[serde(default)]
    pub gas_used: Option<Decimal>,
    /// `None` when the indexer did not report gas used; never zero-filled.
    pub fee: Option<Decimal>,
    pub confirmations: u64,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl NormalizedTx {
    /// Upper bound on what the sender paid for gas.
    pub fn max_fee(&self) -> Result<Decimal> {
        self.gas
            .checked_mul(self.gas_price)
            .ok_or_else(|| WalletError::Overflow(format!("max fee of {}", self.hash)))
    }
}
