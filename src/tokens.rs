//! Shared token registry
//!
//! Well-known ERC-20 tokens per network, so balance queries can accept a
//! symbol ("USDC") as well as an address and format amounts without an extra
//! RPC round trip.

use crate::config::Network;
use alloy::primitives::{address, Address};
use std::collections::HashMap;

/// Token metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub decimals: u8,
}

impl TokenInfo {
    pub const fn new(symbol: &'static str, decimals: u8) -> Self {
        Self { symbol, decimals }
    }
}

/// Well-known token addresses per chain
pub mod addresses {
    use super::*;

    // === Ethereum Mainnet ===
    pub const USDC_ETH: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const USDT_ETH: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
    pub const DAI_ETH: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    pub const WETH_ETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    pub const WBTC_ETH: Address = address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599");

    // === Arbitrum ===
    pub const USDC_ARB: Address = address!("af88d065e77c8cc2239327c5edb3a432268e5831");
    pub const USDT_ARB: Address = address!("fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9");
    pub const DAI_ARB: Address = address!("da10009cbd5d07dd0cecc66161fc93d7c9000da1");
    pub const WETH_ARB: Address = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");

    // === Optimism ===
    pub const USDC_OPT: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");
    pub const USDT_OPT: Address = address!("94b008aa00579c1307b0ef2c499ad98a8ce58e58");
    pub const WETH_OPT: Address = address!("4200000000000000000000000000000000000006");

    // === Base ===
    pub const USDC_BASE: Address = address!("833589fcd6edb6e08f4c7c32d4f71b54bda02913");
    pub const DAI_BASE: Address = address!("50c5725949a6f0c72e6c4a641f24049a917db0cb");
    pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");
}

pub struct TokenRegistry {
    tokens: HashMap<(Network, Address), TokenInfo>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        use addresses::*;

        let usdc = TokenInfo::new("USDC", 6);
        let usdt = TokenInfo::new("USDT", 6);
        let dai = TokenInfo::new("DAI", 18);
        let weth = TokenInfo::new("WETH", 18);

        let entries = [
            (Network::Ethereum, USDC_ETH, usdc),
            (Network::Ethereum, USDT_ETH, usdt),
            (Network::Ethereum, DAI_ETH, dai),
            (Network::Ethereum, WETH_ETH, weth),
            (Network::Ethereum, WBTC_ETH, TokenInfo::new("WBTC", 8)),
            (Network::Arbitrum, USDC_ARB, usdc),
            (Network::Arbitrum, USDT_ARB, usdt),
            (Network::Arbitrum, DAI_ARB, dai),
            (Network::Arbitrum, WETH_ARB, weth),
            (Network::Optimism, USDC_OPT, usdc),
            (Network::Optimism, USDT_OPT, usdt),
            (Network::Optimism, WETH_OPT, weth),
            (Network::Base, USDC_BASE, usdc),
            (Network::Base, DAI_BASE, dai),
            (Network::Base, WETH_BASE, weth),
        ];

        Self {
            tokens: entries
                .into_iter()
                .map(|(network, address, info)| ((network, address), info))
                .collect(),
        }
    }

    pub fn get(&self, network: Network, address: &Address) -> Option<&TokenInfo> {
        self.tokens.get(&(network, *address))
    }

    /// Address of a known token by symbol, case-insensitive
    pub fn address_for_symbol(&self, network: Network, symbol: &str) -> Option<Address> {
        self.tokens
            .iter()
            .find(|((n, _), info)| *n == network && info.symbol.eq_ignore_ascii_case(symbol))
            .map(|((_, address), _)| *address)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global token registry (lazy initialized)
static REGISTRY: std::sync::OnceLock<TokenRegistry> = std::sync::OnceLock::new();

pub fn registry() -> &'static TokenRegistry {
    REGISTRY.get_or_init(TokenRegistry::new)
}
