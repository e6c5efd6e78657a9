//! History normalization and pending-spend accounting.

use rust_decimal::Decimal;

use super::types::{NormalizedTx, RawTx};
use crate::address::same_address;
use crate::error::{Result, WalletError};

/// Convert an indexer transaction into this wallet's view of it.
///
/// The fee is only known when the indexer reports gas used; otherwise it
/// stays `None`. Transactions sent by `own_address` get a negated value.
/// Amounts whose fee cannot be represented are rejected.
pub fn normalize(raw: RawTx, own_address: &str) -> Result<NormalizedTx> {
    let fee = raw
        .gas_used
        .map(|used| {
            used.checked_mul(raw.gas_price)
                .ok_or_else(|| WalletError::Overflow(format!("fee of {}", raw.hash)))
        })
        .transpose()?;
    let value = if same_address(&raw.from, own_address) {
        -raw.value.abs()
    } else {
        raw.value
    };

    let tx = NormalizedTx {
        hash: raw.hash,
        from: raw.from,
        to: raw.to,
        value,
        gas: raw.gas,
        gas_price: raw.gas_price,
        gas_used: raw.gas_used,
        fee,
        confirmations: raw.confirmations,
        block_number: raw.block_number,
        timestamp: raw.timestamp,
    };
    tx.max_fee()?;
    Ok(tx)
}

/// Funds committed to outgoing transactions that have not reached `min_conf`.
pub fn pending_spends(history: &[NormalizedTx], own_address: &str, min_conf: u64) -> Result<Decimal> {
    history
        .iter()
        .filter(|tx| tx.confirmations < min_conf && same_address(&tx.from, own_address))
        .try_fold(Decimal::ZERO, |acc, tx| {
            tx.max_fee()?
                .checked_add(tx.value.abs())
                .and_then(|spend| acc.checked_add(spend))
                .ok_or_else(|| WalletError::Overflow("pending spends".to_string()))
        })
}
