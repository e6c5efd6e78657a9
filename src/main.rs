use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ethwallet::cli::{self, Cli, Context};
use ethwallet::config::WalletConfig;

/// Log level from the config file, if it can be read, before logging is up.
fn configured_log_level(path: &str) -> String {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| WalletConfig::from_toml(&s).ok())
        .map(|c| c.log_level)
        .unwrap_or_else(|| "info".to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_log_level(&cli.config)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = WalletConfig::load_or_default(&cli.config);
    let ctx = Context::new(config);

    if let Err(e) = cli::run(cli.command, &ctx).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
