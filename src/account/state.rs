//! Single-address account state: identity, balances, nonce, fee snapshot and history.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::history::{normalize, pending_spends};
use super::types::{NormalizedTx, RawTx};
use crate::address::{address_to_iban, same_address};
use crate::client::ChainApi;
use crate::crypto::KeyPair;
use crate::error::{Result, WalletError};

pub const DEFAULT_MIN_CONF: u64 = 5;
/// Gas needed by a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// `gas_limit * gas_price`, rejecting rates too large to price a transfer.
pub(crate) fn standard_fee(gas_limit: Decimal, gas_price: Decimal) -> Result<Decimal> {
    gas_limit
        .checked_mul(gas_price)
        .ok_or_else(|| WalletError::Overflow(format!("fee at gas price {}", gas_price)))
}

#[derive(Clone, Debug)]
pub struct AccountState {
    pub(crate) network_id: String,
    pub(crate) keys: KeyPair,
    pub(crate) balance: Decimal,
    pub(crate) confirmed_balance: Decimal,
    pub(crate) nonce: u64,
    pub(crate) gas_price: Decimal,
    pub(crate) gas_limit: Decimal,
    pub(crate) min_conf: u64,
    /// Most recent first.
    pub(crate) history: Vec<NormalizedTx>,
}

impl AccountState {
    /// Derive the wallet key from `seed` and load its state from the indexer.
    ///
    /// An empty seed fails before any remote call. The four lookups run
    /// concurrently; the first failure aborts construction and is returned.
    pub async fn from_seed<A: ChainApi + ?Sized>(
        seed: &[u8],
        network_id: &str,
        min_conf: u64,
        api: &A,
    ) -> Result<Self> {
        let keys = KeyPair::from_seed(seed)?;
        let address = keys.address().to_string();
        info!("Loading account {} on {}", address, network_id);

        let (balance, tx_count, gas_price, raw_history) = tokio::try_join!(
            api.get_balance(&address, min_conf),
            api.get_tx_count(&address),
            api.get_gas_price(),
            api.get_tx_history(&address),
        )?;

        let gas_limit = Decimal::from(DEFAULT_GAS_LIMIT);
        standard_fee(gas_limit, gas_price)?;
        let history = raw_history
            .into_iter()
            .map(|raw| normalize(raw, &address))
            .collect::<Result<Vec<_>>>()?;
        debug!("Account {}: nonce {}, {} history entries", address, tx_count, history.len());

        Ok(AccountState {
            network_id: network_id.to_string(),
            keys,
            balance: balance.balance,
            confirmed_balance: balance.confirmed_balance,
            nonce: tx_count,
            gas_price,
            gas_limit,
            min_conf,
            history,
        })
    }

    pub fn address(&self) -> &str {
        self.keys.address()
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn public_key_hex(&self) -> String {
        self.keys.public_key_hex()
    }

    /// ICAP form of the wallet address.
    pub fn iban(&self) -> Result<String> {
        address_to_iban(self.address())
    }

    /// Optimistic balance, already reduced by locally recorded sends.
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn confirmed_balance(&self) -> Decimal {
        self.confirmed_balance
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn gas_price(&self) -> Decimal {
        self.gas_price
    }

    pub fn gas_limit(&self) -> Decimal {
        self.gas_limit
    }

    pub fn min_conf(&self) -> u64 {
        self.min_conf
    }

    pub fn history(&self) -> &[NormalizedTx] {
        &self.history
    }

    /// Value plus maximum gas cost of our own transactions below `min_conf`.
    pub fn pending_spends(&self) -> Result<Decimal> {
        pending_spends(&self.history, self.address(), self.min_conf)
    }

    /// Cost of a standard transfer at the last known gas price.
    ///
    /// Every path that sets the gas price checks that this product fits.
    pub fn default_fee(&self) -> Decimal {
        self.gas_limit.saturating_mul(self.gas_price)
    }

    /// Apply a transaction the network has accepted.
    ///
    /// The balance moves by the signed value less the maximum fee. Only
    /// outgoing transactions advance the nonce. This is the only way balance,
    /// nonce and history change after construction (apart from an explicit
    /// [`resync`](Self::resync)). On error nothing is changed.
    pub fn record_transaction(&mut self, raw: RawTx) -> Result<&NormalizedTx> {
        let tx = normalize(raw, self.address())?;
        let outgoing = same_address(&tx.from, self.address());

        let fee = tx.max_fee()?;
        self.balance = self
            .balance
            .checked_add(tx.value)
            .and_then(|b| b.checked_sub(fee))
            .ok_or_else(|| WalletError::Overflow(format!("balance after {}", tx.hash)))?;
        if outgoing {
            self.nonce += 1;
        }
        info!(
            "Recorded tx {} (value {}, fee {}), balance now {}, nonce {}",
            tx.hash, tx.value, fee, self.balance, self.nonce
        );

        self.history.insert(0, tx);
        Ok(&self.history[0])
    }

    /// Re-read the fee rate. Never called implicitly.
    pub async fn refresh_gas_price<A: ChainApi + ?Sized>(&mut self, api: &A) -> Result<Decimal> {
        let gas_price = api.get_gas_price().await?;
        standard_fee(self.gas_limit, gas_price)?;
        debug!("Gas price {} -> {}", self.gas_price, gas_price);
        self.gas_price = gas_price;
        Ok(gas_price)
    }

    /// Replace balances, nonce and history with fresh remote values.
    ///
    /// Used to reconcile after a broadcast whose result could not be fetched.
    /// Nothing changes unless all three lookups succeed.
    pub async fn resync<A: ChainApi + ?Sized>(&mut self, api: &A) -> Result<()> {
        let address = self.address().to_string();
        let (balance, tx_count, raw_history) = tokio::try_join!(
            api.get_balance(&address, self.min_conf),
            api.get_tx_count(&address),
            api.get_tx_history(&address),
        )?;
        let history = raw_history
            .into_iter()
            .map(|raw| normalize(raw, &address))
            .collect::<Result<Vec<_>>>()?;

        self.balance = balance.balance;
        self.confirmed_balance = balance.confirmed_balance;
        self.nonce = tx_count;
        self.history = history;
        info!("Resynced {}: balance {}, nonce {}", address, self.balance, self.nonce);
        Ok(())
    }

    /// `address,privatekey` CSV with a single data row.
    pub fn export_keys(&self) -> String {
        format!("address,privatekey\n{},{}", self.address(), self.keys.private_key_hex())
    }
}
