use rust_decimal::Decimal;
use thiserror::Error;

use crate::tx::validation::ValidationError;

pub type Result<T> = std::result::Result<T, WalletError>;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Insufficient funds: amount {amount} does not cover fee {fee}")]
    InsufficientFunds { amount: Decimal, fee: Decimal },
    #[error("Transaction rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error("Amount overflow: {0}")]
    Overflow(String),
    #[error("Remote call failed: {0}")]
    Remote(String),
    /// Broadcast succeeded but the follow-up fetch did not, so local state is stale.
    #[error("Transaction {tx_id} was broadcast but could not be recorded: {source}")]
    Unrecorded {
        tx_id: String,
        #[source]
        source: Box<WalletError>,
    },
    #[error("Signing failed: {0}")]
    Signing(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl WalletError {
    /// True when the failure came from (or after) a collaborator call rather than local input.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Unrecorded { .. })
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Serialization(err.to_string())
    }
}
