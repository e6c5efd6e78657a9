use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::account::DEFAULT_MIN_CONF;
use crate::error::{Result, WalletError};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletConfig {
    pub api: ApiConfig,
    pub wallet: WalletSection,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// JSON-RPC endpoint of the indexing service.
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WalletSection {
    pub network_id: String,
    #[serde(default = "default_min_conf")]
    pub min_conf: u64,
    #[serde(default = "default_wallet_file")]
    pub wallet_file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_conf() -> u64 {
    DEFAULT_MIN_CONF
}

fn default_wallet_file() -> String {
    "wallet.json".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                url: "http://localhost:8545".to_string(),
            },
            wallet: WalletSection {
                network_id: "mainnet".to_string(),
                min_conf: DEFAULT_MIN_CONF,
                wallet_file: default_wallet_file(),
            },
            log_level: default_log_level(),
        }
    }
}

impl WalletConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))
    }

    pub fn load_or_default(path: &str) -> Self {
        if Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match Self::from_toml(&s) {
                    Ok(c) => {
                        info!("Config loaded from {}", path);
                        c
                    }
                    Err(e) => {
                        warn!("Error parsing config: {}. Using defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Error reading config: {}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            match toml::to_string_pretty(&config) {
                Ok(s) => {
                    if let Err(e) = std::fs::write(path, s) {
                        warn!("Could not write default config to {}: {}", path, e);
                    }
                }
                Err(e) => warn!("Could not render default config: {}", e),
            }
            config
        }
    }
}
