//! Account state for a single-address wallet.
//!
//! This module holds the accounting core:
//! - Balance, confirmed balance and pending-spend figures
//! - Nonce tracking for outgoing transactions
//! - Normalized transaction history
//! - The persisted wallet record

pub mod types;
pub mod history;
pub mod state;
pub mod record;

pub use types::{BalanceInfo, NormalizedTx, RawTx};
pub use state::{AccountState, DEFAULT_GAS_LIMIT, DEFAULT_MIN_CONF};
pub use record::WalletRecord;
