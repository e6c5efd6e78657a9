pub mod account; // balances, nonce, history, persisted record
pub mod address;
pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod tx;

pub use account::{AccountState, NormalizedTx, RawTx, WalletRecord};
pub use client::{ChainApi, RpcClient};
pub use error::{Result, WalletError};
