//! Configuration for the on-chain query agent

pub mod rpc;

use crate::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub use rpc::RpcConfig;

/// Environment variable holding the completion-service API key
pub const LLM_API_KEY_ENV: &str = "LLM_API_KEY";
pub const LLM_BASE_URL_ENV: &str = "LLM_BASE_URL";
pub const LLM_MODEL_ENV: &str = "LLM_MODEL";

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Ethereum,
    Arbitrum,
    Optimism,
    Base,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Ethereum,
        Network::Arbitrum,
        Network::Optimism,
        Network::Base,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Arbitrum => 42161,
            Network::Optimism => 10,
            Network::Base => 8453,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Arbitrum => "arbitrum",
            Network::Optimism => "optimism",
            Network::Base => "base",
        }
    }

    /// Block explorer base URL for transaction links
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        let host = match self {
            Network::Ethereum => "etherscan.io",
            Network::Arbitrum => "arbiscan.io",
            Network::Optimism => "optimistic.etherscan.io",
            Network::Base => "basescan.org",
        };
        format!("https://{}/tx/{}", host, tx_hash)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ethereum" | "mainnet" | "eth" | "1" => Ok(Network::Ethereum),
            "arbitrum" | "arbitrum one" | "arb" | "42161" => Ok(Network::Arbitrum),
            "optimism" | "op" | "10" => Ok(Network::Optimism),
            "base" | "8453" => Ok(Network::Base),
            other => Err(Error::InvalidArgument(format!("Unknown network: {}", other))),
        }
    }
}

/// Completion service settings
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL; requests go to `{base_url}/chat/completions`
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    /// Only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_secs: 120,
            api_key: None,
        }
    }
}

/// Pipeline behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Name the assistant uses when asked who it is
    pub assistant_name: String,
    /// Network assumed when a query does not name one
    pub default_network: Network,
    /// Upper bound for a single tool invocation. Omitted means 60s; an
    /// explicit `null` disables the bound.
    pub tool_timeout_secs: Option<u64>,
    /// Path to JSONL audit log file
    pub audit_log_path: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            assistant_name: "Sage".to_string(),
            default_network: Network::Ethereum,
            tool_timeout_secs: Some(60),
            audit_log_path: None,
        }
    }
}

/// Main configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl Config {
    /// Load from a JSON file (or defaults), then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))?
            }
            None => Config::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(LLM_BASE_URL_ENV) {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup(LLM_MODEL_ENV) {
            self.llm.model = model;
        }
        if let Some(key) = lookup(LLM_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.llm.api_key = Some(SecretString::from(key));
        }
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.llm.base_url)
            .map_err(|e| Error::Config(format!("invalid llm.base_url: {}", e)))?;
        if self.llm.model.trim().is_empty() {
            return Err(Error::Config("llm.model must not be empty".to_string()));
        }
        if self.agent.tool_timeout_secs == Some(0) {
            return Err(Error::Config(
                "agent.tool_timeout_secs must be positive (set it to null to disable)".to_string(),
            ));
        }
        Ok(())
    }
}
