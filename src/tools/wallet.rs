//! Balance query tools
//!
//! Queries native and ERC-20 token balances from blockchain RPCs.
//!
//! SECURITY NOTE:
//! - These tools are READ-ONLY
//! - They never receive the caller's signing wallet
//! - Addresses are public information

use super::{network_arg, ToolArgs, ToolHandler};
use crate::answer::AnswerEntry;
use crate::config::{Network, RpcConfig};
use crate::tokens;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// ERC-20 `balanceOf(address)`
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// ERC-20 `decimals()`
const DECIMALS_SELECTOR: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

/// Read-only access to chain state
#[derive(Debug, Clone)]
pub struct ChainReader {
    rpc: RpcConfig,
}

impl ChainReader {
    pub fn new(rpc: RpcConfig) -> Self {
        Self { rpc }
    }

    pub(crate) fn rpc_url(&self, network: Network) -> Result<url::Url> {
        let rpc_url = self.rpc.get(network).ok_or_else(|| {
            Error::Config(format!("No RPC URL configured for {}", network.name()))
        })?;
        rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL for {}: {}", network.name(), e)))
    }

    /// Native balance (ETH on every supported network)
    pub async fn native_balance(&self, holder: Address, network: Network) -> Result<Value> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url(network)?);

        let balance = provider
            .get_balance(holder)
            .await
            .map_err(|e| Error::ToolExecution(format!("Failed to get balance: {}", e)))?;

        Ok(json!({
            "address": holder.to_string(),
            "symbol": "ETH",
            "balance_raw": balance.to_string(),
            "balance_formatted": format_units(balance, 18),
            "decimals": 18,
            "network": network.name(),
            "chain_id": network.chain_id(),
            "is_native": true
        }))
    }

    /// ERC-20 balance via `eth_call`
    pub async fn token_balance(
        &self,
        holder: Address,
        token: Address,
        network: Network,
    ) -> Result<Value> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url(network)?);

        let mut calldata = BALANCE_OF_SELECTOR.to_vec();
        calldata.extend_from_slice(&[0u8; 12]);
        calldata.extend_from_slice(holder.as_slice());

        let tx = TransactionRequest::default()
            .to(token)
            .input(Bytes::from(calldata).into());
        let result = provider
            .call(tx)
            .await
            .map_err(|e| Error::ToolExecution(format!("Failed to get token balance: {}", e)))?;
        let balance = decode_u256(&result);

        let (symbol, decimals) = match tokens::registry().get(network, &token) {
            Some(info) => (info.symbol.to_string(), info.decimals),
            None => {
                let tx = TransactionRequest::default()
                    .to(token)
                    .input(Bytes::from(DECIMALS_SELECTOR.to_vec()).into());
                let decimals = match provider.call(tx).await {
                    Ok(raw) => u8::try_from(decode_u256(&raw)).unwrap_or(18),
                    Err(e) => {
                        tracing::warn!(
                            token = %token,
                            error = %e,
                            "decimals() failed, assuming 18"
                        );
                        18
                    }
                };
                ("UNKNOWN".to_string(), decimals)
            }
        };

        Ok(json!({
            "address": holder.to_string(),
            "token": token.to_string(),
            "symbol": symbol,
            "balance_raw": balance.to_string(),
            "balance_formatted": format_units(balance, decimals as u32),
            "decimals": decimals,
            "network": network.name(),
            "chain_id": network.chain_id(),
            "is_native": false
        }))
    }
}

fn decode_u256(raw: &[u8]) -> U256 {
    if raw.len() >= 32 {
        U256::from_be_slice(&raw[..32])
    } else {
        U256::ZERO
    }
}

/// Format a U256 value with decimals
pub fn format_units(value: U256, decimals: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let remainder_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = remainder_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}

pub(crate) fn parse_address(raw: &str, name: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| Error::InvalidArgument(format!("{} is not a valid address: {}", name, e)))
}

/// `get_native_balance(address, network?)`
pub struct NativeBalanceTool {
    reader: Arc<ChainReader>,
    default_network: Network,
}

impl NativeBalanceTool {
    pub fn new(reader: Arc<ChainReader>, default_network: Network) -> Self {
        Self {
            reader,
            default_network,
        }
    }
}

#[async_trait]
impl ToolHandler for NativeBalanceTool {
    async fn call(&self, args: ToolArgs) -> Result<String> {
        let holder = parse_address(&args.require_str(0, "address")?, "address")?;
        let network = network_arg(&args, 1, self.default_network)?;

        let balance = self.reader.native_balance(holder, network).await?;
        let entry = AnswerEntry::success(
            format!("Fetched the native balance of {} on {}", holder, network.name()),
            balance,
            String::new(),
        );
        Ok(entry.to_tool_output())
    }
}

/// `get_token_balance(address, token, network?)`; `token` may be a symbol
pub struct TokenBalanceTool {
    reader: Arc<ChainReader>,
    default_network: Network,
}

impl TokenBalanceTool {
    pub fn new(reader: Arc<ChainReader>, default_network: Network) -> Self {
        Self {
            reader,
            default_network,
        }
    }
}

fn resolve_token(raw: &str, network: Network) -> Result<Address> {
    if let Some(address) = tokens::registry().address_for_symbol(network, raw.trim()) {
        return Ok(address);
    }
    parse_address(raw, "token").map_err(|_| {
        Error::InvalidArgument(format!(
            "Unknown token {} on {}. Pass the token contract address.",
            raw,
            network.name()
        ))
    })
}

#[async_trait]
impl ToolHandler for TokenBalanceTool {
    async fn call(&self, args: ToolArgs) -> Result<String> {
        let holder = parse_address(&args.require_str(0, "address")?, "address")?;
        let network = network_arg(&args, 2, self.default_network)?;
        let token = resolve_token(&args.require_str(1, "token")?, network)?;

        let balance = self.reader.token_balance(holder, token, network).await?;
        let entry = AnswerEntry::success(
            format!("Fetched the token balance of {} on {}", holder, network.name()),
            balance,
            String::new(),
        );
        Ok(entry.to_tool_output())
    }
}
