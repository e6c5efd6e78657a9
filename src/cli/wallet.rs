use chrono::DateTime;

use super::Context;
use crate::account::AccountState;
use crate::address::to_checksum_address;
use crate::crypto::KeyPair;
use crate::error::{Result, WalletError};

pub fn handle_generate() -> Result<()> {
    let mnemonic = KeyPair::generate_mnemonic()?;
    println!("Mnemonic: {}", mnemonic);
    println!("KEEP THIS SAFE!");
    Ok(())
}

pub async fn handle_init(ctx: &Context, mnemonic: &str) -> Result<()> {
    let path = ctx.wallet_path();
    if path.exists() {
        return Err(WalletError::InvalidArgument(format!(
            "'{}' already exists. Aborting to prevent overwrite.",
            path.display()
        )));
    }

    let seed = KeyPair::seed_from_mnemonic(mnemonic)?;
    let state = AccountState::from_seed(
        &seed,
        &ctx.config.wallet.network_id,
        ctx.config.wallet.min_conf,
        &ctx.api,
    )
    .await?;
    ctx.save_state(&state)?;

    println!("Wallet created: {}", path.display());
    println!("Address: {}", to_checksum_address(state.address())?);
    println!("Balance: {}", state.balance());
    Ok(())
}

pub fn handle_info(ctx: &Context) -> Result<()> {
    let state = ctx.load_state()?;
    println!("Network:           {}", state.network_id());
    println!("Address:           {}", to_checksum_address(state.address())?);
    println!("IBAN:              {}", state.iban()?);
    println!("Balance:           {}", state.balance());
    println!("Confirmed balance: {}", state.confirmed_balance());
    println!("Pending spends:    {}", state.pending_spends()?);
    println!("Nonce:             {}", state.nonce());
    println!("Gas price:         {}", state.gas_price());
    println!("Default fee:       {}", state.default_fee());
    Ok(())
}

pub fn handle_history(ctx: &Context) -> Result<()> {
    let state = ctx.load_state()?;
    if state.history().is_empty() {
        println!("No transactions.");
        return Ok(());
    }
    for tx in state.history() {
        let when = tx
            .timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "pending".to_string());
        let fee = tx.fee.map(|f| f.to_string()).unwrap_or_else(|| "?".to_string());
        println!(
            "{}  {}  value {}  fee {}  conf {}",
            when, tx.hash, tx.value, fee, tx.confirmations
        );
    }
    Ok(())
}

pub async fn handle_sync(ctx: &Context) -> Result<()> {
    let mut state = ctx.load_state()?;
    state.resync(&ctx.api).await?;
    state.refresh_gas_price(&ctx.api).await?;
    ctx.save_state(&state)?;
    println!("Synced. Balance: {}  Nonce: {}", state.balance(), state.nonce());
    Ok(())
}

pub fn handle_export_keys(ctx: &Context) -> Result<()> {
    let state = ctx.load_state()?;
    println!("{}", state.export_keys());
    Ok(())
}
