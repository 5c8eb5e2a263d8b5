//! Tool catalog and built-in on-chain tools
//!
//! Tools are async handlers taking positional [`ToolArgs`] and returning the
//! JSON-encoded single-element answer array. The built-in set covers the
//! connected wallet (address, signing, transfers) and read-only balance
//! queries.

mod registry;
mod transfer;
mod types;
mod wallet;
mod wallet_signing;

pub use registry::{
    handler_fn, FnHandler, ParamType, ParameterSpec, ToolDescriptor, ToolHandler, ToolRegistry,
};
pub use transfer::SendNativeTool;
pub use types::ToolArgs;
pub use wallet::{format_units, ChainReader, NativeBalanceTool, TokenBalanceTool};
pub use wallet_signing::{SignMessageTool, WalletAddressTool};

use crate::config::{Network, RpcConfig};
use crate::Result;
use std::sync::Arc;

pub const TOOL_WALLET_ADDRESS: &str = "wallet_address";
pub const TOOL_SIGN_MESSAGE: &str = "sign_message";
pub const TOOL_NATIVE_BALANCE: &str = "get_native_balance";
pub const TOOL_TOKEN_BALANCE: &str = "get_token_balance";
pub const TOOL_SEND_NATIVE: &str = "send_native";

/// Optional network argument at `index`, falling back to `default`
pub(crate) fn network_arg(args: &ToolArgs, index: usize, default: Network) -> Result<Network> {
    match args.str(index) {
        Some(raw) if !raw.trim().is_empty() => raw.parse(),
        _ => Ok(default),
    }
}

fn network_param() -> ParameterSpec {
    ParameterSpec::optional(
        "network",
        ParamType::String,
        "ethereum, arbitrum, optimism or base; defaults to the configured network",
    )
}

/// Register the built-in tools.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    rpc: RpcConfig,
    default_network: Network,
) -> Result<()> {
    let reader = Arc::new(ChainReader::new(rpc));

    registry.register(
        TOOL_WALLET_ADDRESS,
        "Returns the address of the user's connected wallet.",
        vec![ParameterSpec::signer()],
        WalletAddressTool,
    )?;

    registry.register(
        TOOL_SIGN_MESSAGE,
        "Signs a text message (EIP-191) with the user's connected wallet.",
        vec![
            ParameterSpec::required("message", ParamType::String, "Text to sign"),
            ParameterSpec::signer(),
        ],
        SignMessageTool,
    )?;

    registry.register(
        TOOL_NATIVE_BALANCE,
        "Gets the native ETH balance of an address.",
        vec![
            ParameterSpec::required("address", ParamType::Address, "Address to query"),
            network_param(),
        ],
        NativeBalanceTool::new(Arc::clone(&reader), default_network),
    )?;

    registry.register(
        TOOL_TOKEN_BALANCE,
        "Gets the ERC-20 token balance of an address.",
        vec![
            ParameterSpec::required("address", ParamType::Address, "Address to query"),
            ParameterSpec::required(
                "token",
                ParamType::String,
                "Token contract address or a well-known symbol (USDC, USDT, DAI, WETH, WBTC)",
            ),
            network_param(),
        ],
        TokenBalanceTool::new(Arc::clone(&reader), default_network),
    )?;

    registry.register(
        TOOL_SEND_NATIVE,
        "Sends native ETH from the user's connected wallet. Irreversible.",
        vec![
            ParameterSpec::required("to_address", ParamType::Address, "Recipient address"),
            ParameterSpec::required("amount", ParamType::Number, "Amount in ETH, e.g. 0.05"),
            network_param(),
            ParameterSpec::signer(),
        ],
        SendNativeTool::new(reader, default_network),
    )?;

    Ok(())
}
