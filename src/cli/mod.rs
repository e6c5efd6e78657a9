pub mod tx;
pub mod wallet;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::account::{AccountState, WalletRecord};
use crate::client::RpcClient;
use crate::config::WalletConfig;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "ethwallet")]
#[command(about = "Single-address account wallet", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = "wallet.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a fresh 12-word mnemonic
    Generate,
    /// Create the wallet file from a mnemonic
    Init {
        #[arg(long)]
        mnemonic: String,
    },
    /// Show address, balances and fees
    Info,
    /// List known transactions, newest first
    History,
    /// Reload balances, nonce, history and gas price from the indexer
    Sync,
    /// Send funds to a hex or IBAN address
    Send {
        #[arg(long)]
        to: String,
        /// Amount in wei
        #[arg(long)]
        value: String,
        /// Print the signed transaction instead of broadcasting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Sweep the balance of an external private key into this wallet
    Import {
        #[arg(long)]
        private_key: String,
    },
    /// Print address and private key as CSV
    ExportKeys,
}

/// Everything a command handler needs.
pub struct Context {
    pub config: WalletConfig,
    pub api: RpcClient,
}

impl Context {
    pub fn new(config: WalletConfig) -> Self {
        let api = RpcClient::new(config.api.url.clone());
        Self { config, api }
    }

    pub fn wallet_path(&self) -> PathBuf {
        PathBuf::from(&self.config.wallet.wallet_file)
    }

    pub fn load_state(&self) -> Result<AccountState> {
        AccountState::deserialize(WalletRecord::load(&self.wallet_path())?)
    }

    pub fn save_state(&self, state: &AccountState) -> Result<()> {
        state.serialize().save(&self.wallet_path())
    }
}

pub async fn run(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Generate => wallet::handle_generate(),
        Commands::Init { mnemonic } => wallet::handle_init(ctx, &mnemonic).await,
        Commands::Info => wallet::handle_info(ctx),
        Commands::History => wallet::handle_history(ctx),
        Commands::Sync => wallet::handle_sync(ctx).await,
        Commands::Send { to, value, dry_run } => tx::handle_send(ctx, &to, &value, dry_run).await,
        Commands::Import { private_key } => tx::handle_import(ctx, &private_key).await,
        Commands::ExportKeys => wallet::handle_export_keys(ctx),
    }
}
