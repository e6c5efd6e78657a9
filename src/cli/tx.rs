use rust_decimal::Decimal;
use std::str::FromStr;

use super::Context;
use crate::crypto::parse_private_key;
use crate::error::{Result, WalletError};
use crate::tx::{build_import_transfer, build_transfer, prepare_import, send};

pub async fn handle_send(ctx: &Context, to: &str, value: &str, dry_run: bool) -> Result<()> {
    let value = Decimal::from_str(value.trim())
        .map_err(|e| WalletError::InvalidArgument(format!("bad amount '{}': {}", value, e)))?;

    let mut state = ctx.load_state()?;
    println!("Fetching gas price...");
    state.refresh_gas_price(&ctx.api).await?;

    let signed = build_transfer(&state, to, value)?;
    if dry_run {
        println!("Signed transaction: {}", signed.to_hex());
        println!("Tx hash: {}", signed.tx_hash());
        return Ok(());
    }

    println!("Submitting transfer...");
    match send(&mut state, &ctx.api, &signed).await {
        Ok(tx_id) => {
            ctx.save_state(&state)?;
            println!("Success! Tx Hash: {}", tx_id);
            Ok(())
        }
        Err(WalletError::Unrecorded { tx_id, source }) => {
            println!("Transaction {} was broadcast but not confirmed locally. Run `sync`.", tx_id);
            Err(WalletError::Unrecorded { tx_id, source })
        }
        Err(e) => Err(e),
    }
}

pub async fn handle_import(ctx: &Context, private_key: &str) -> Result<()> {
    let key = parse_private_key(private_key)?;
    let mut state = ctx.load_state()?;
    state.refresh_gas_price(&ctx.api).await?;

    let candidate = prepare_import(&state, &ctx.api, &key).await?;
    println!("Found {} with confirmed balance {}", candidate.address, candidate.amount);

    let options = candidate.with_fee(state.default_fee());
    let signed = build_import_transfer(&state, &options)?;
    let tx_id = send(&mut state, &ctx.api, &signed).await?;
    ctx.save_state(&state)?;
    println!("Swept into {}. Tx Hash: {}", state.address(), tx_id);
    Ok(())
}
