// Client module
pub mod rpc_client;
#[cfg(test)]
pub mod mock;

pub use rpc_client::RpcClient;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::account::types::{BalanceInfo, RawTx};
use crate::error::Result;

/// Remote data-access API the wallet depends on.
///
/// Every method makes a single attempt; failures come back as
/// [`WalletError::Remote`](crate::error::WalletError::Remote).
#[async_trait]
pub trait ChainApi: Send + Sync {
    async fn get_balance(&self, address: &str, min_conf: u64) -> Result<BalanceInfo>;

    /// Number of transactions the address has sent (its next nonce).
    async fn get_tx_count(&self, address: &str) -> Result<u64>;

    async fn get_gas_price(&self) -> Result<Decimal>;

    /// Full history, most recent first.
    async fn get_tx_history(&self, address: &str) -> Result<Vec<RawTx>>;

    async fn get_tx(&self, tx_id: &str, address: &str) -> Result<RawTx>;

    /// Submit a 0x-prefixed raw transaction, returning its id.
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String>;
}
