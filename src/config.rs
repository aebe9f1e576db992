use std::collections::HashMap;
use std::path::Path;

use eyre::{ContextCompat, WrapErr};
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::cli::PrivateKey;
use crate::serde_utils;

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const HARDHAT_CHAIN_ID: u64 = 31337;

/// Chains a local node (Hardhat, Anvil, Ganache) reports.
pub const DEV_CHAIN_IDS: [u64; 2] = [HARDHAT_CHAIN_ID, 1337];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub networks: HashMap<String, NetworkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub url: String,

    /// When set, the connected node must report this chain id
    #[serde(default)]
    pub chain_id: Option<u64>,

    #[serde(default)]
    pub accounts: Vec<PrivateKey>,

    #[serde(default = "default_confirmations")]
    pub confirmations: usize,
}

fn default_confirmations() -> usize {
    1
}

impl NetworkConfig {
    fn local() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            chain_id: Some(HARDHAT_CHAIN_ID),
            accounts: vec![],
            confirmations: default_confirmations(),
        }
    }

    pub fn rpc_url(&self) -> eyre::Result<Url> {
        self.url
            .parse()
            .wrap_err_with(|| format!("Invalid network url {}", self.url))
    }
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            networks: maplit::hashmap! {
                "localhost".to_string() => NetworkConfig::local(),
                "hardhat".to_string() => NetworkConfig::local(),
            },
        }
    }

    /// Reads the config file, falling back to the built-in local networks
    /// when it doesn't exist.
    pub async fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(
                "No network config at {}, using built-in networks",
                path.display()
            );
            return Ok(Self::builtin());
        }

        serde_utils::read_deserialize(path).await
    }

    pub fn network(&self, name: &str) -> eyre::Result<&NetworkConfig> {
        self.networks.get(name).with_context(|| {
            let mut known: Vec<_> = self.networks.keys().cloned().collect();
            known.sort();

            format!(
                "Unknown network {name}, known networks: {}",
                known.join(", ")
            )
        })
    }
}
