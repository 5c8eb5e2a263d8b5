//! Native currency transfer tool
//!
//! SECURITY NOTE:
//! - Irreversible. The executor never retries tool calls, and this tool does
//!   not retry internally either.
//! - Requires the caller's signing wallet (declared signer parameter).

use super::wallet::{parse_address, ChainReader};
use super::{network_arg, ToolArgs, ToolHandler};
use crate::answer::AnswerEntry;
use crate::config::Network;
use crate::{Error, Result};
use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// `send_native(to_address, amount, network?, signer)`; amount in ether
pub struct SendNativeTool {
    reader: Arc<ChainReader>,
    default_network: Network,
}

impl SendNativeTool {
    pub fn new(reader: Arc<ChainReader>, default_network: Network) -> Self {
        Self {
            reader,
            default_network,
        }
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<U256> {
    let value = parse_ether(raw.trim())
        .map_err(|e| Error::InvalidArgument(format!("Invalid amount {}: {}", raw, e)))?;
    if value.is_zero() {
        return Err(Error::InvalidArgument("Amount must be positive".to_string()));
    }
    Ok(value)
}

#[async_trait]
impl ToolHandler for SendNativeTool {
    async fn call(&self, args: ToolArgs) -> Result<String> {
        let to = parse_address(&args.require_str(0, "to_address")?, "to_address")?;
        let amount_raw = args.require_str(1, "amount")?;
        let amount = parse_amount(&amount_raw)?;
        let network = network_arg(&args, 2, self.default_network)?;
        let wallet = args.signer()?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(self.reader.rpc_url(network)?);

        let tx = TransactionRequest::default()
            .from(wallet.address())
            .to(to)
            .value(amount);

        tracing::info!(
            from = %wallet.address_string(),
            to = %to,
            amount = %amount_raw,
            network = network.name(),
            "Sending native transfer"
        );

        let receipt = provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::ToolExecution(format!("Failed to send transaction: {}", e)))?
            .get_receipt()
            .await
            .map_err(|e| Error::ToolExecution(format!("Failed to confirm transaction: {}", e)))?;

        let tx_hash = receipt.transaction_hash.to_string();
        let succeeded = receipt.status();
        tracing::info!(tx_hash = %tx_hash, succeeded, "Transfer mined");

        let details = json!({
            "tx_hash": tx_hash,
            "explorer_url": network.explorer_tx_url(&tx_hash),
            "from": wallet.address_string(),
            "to": to.to_string(),
            "amount": amount_raw,
            "symbol": "ETH",
            "network": network.name(),
            "block_number": receipt.block_number,
        });

        if !succeeded {
            return Err(Error::ToolExecution(format!(
                "Transaction {} reverted: {}",
                tx_hash, details
            )));
        }

        let entry = AnswerEntry::success(
            format!("Sent {} ETH to {} on {}", amount_raw, to, network.name()),
            details,
            String::new(),
        );
        Ok(entry.to_tool_output())
    }
}
