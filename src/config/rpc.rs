//! RPC endpoint configuration
//!
//! Resolution order, per network:
//! 1. Per-chain env vars (`ETH_RPC_URL`, `ARBITRUM_RPC_URL`, ...)
//! 2. `ALCHEMY_API_KEY`, which builds URLs for every supported chain
//! 3. Public RPC fallbacks (rate limited, for testing only)

use super::Network;
use std::collections::HashMap;

/// Environment variable names
mod env_vars {
    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
}

/// RPC configuration for the supported networks
#[derive(Debug, Clone)]
pub struct RpcConfig {
    urls: HashMap<Network, String>,
}

impl Network {
    fn rpc_env_var(&self) -> &'static str {
        match self {
            Network::Ethereum => "ETH_RPC_URL",
            Network::Arbitrum => "ARBITRUM_RPC_URL",
            Network::Optimism => "OPTIMISM_RPC_URL",
            Network::Base => "BASE_RPC_URL",
        }
    }

    fn alchemy_url(&self, key: &str) -> String {
        let host = match self {
            Network::Ethereum => "eth-mainnet",
            Network::Arbitrum => "arb-mainnet",
            Network::Optimism => "opt-mainnet",
            Network::Base => "base-mainnet",
        };
        format!("https://{}.g.alchemy.com/v2/{}", host, key)
    }

    fn public_rpc(&self) -> &'static str {
        match self {
            Network::Ethereum => "https://eth.llamarpc.com",
            Network::Arbitrum => "https://arb1.arbitrum.io/rpc",
            Network::Optimism => "https://mainnet.optimism.io",
            Network::Base => "https://mainnet.base.org",
        }
    }
}

impl RpcConfig {
    /// Create RPC config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same resolution as [`RpcConfig::from_env`], reading variables via `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let alchemy_key = lookup(env_vars::ALCHEMY_API_KEY).filter(|k| !k.is_empty());
        let mut urls = HashMap::new();

        for network in Network::ALL {
            let url = if let Some(url) = lookup(network.rpc_env_var()) {
                tracing::debug!(network = network.name(), "Using per-chain RPC URL");
                url
            } else if let Some(key) = alchemy_key.as_deref() {
                network.alchemy_url(key)
            } else {
                tracing::debug!(
                    network = network.name(),
                    "No RPC configured, using public RPC (rate limited)"
                );
                network.public_rpc().to_string()
            };
            urls.insert(network, url);
        }

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<Network, String>) -> Self {
        Self { urls }
    }

    pub fn get(&self, network: Network) -> Option<&str> {
        self.urls.get(&network).map(|s| s.as_str())
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
