//! Wallet identity and signing tools.
//!
//! SECURITY NOTE:
//! - The wallet arrives through the trailing signer argument only.
//! - Returns signatures and hashes, never raw key material.

use super::{ToolArgs, ToolHandler};
use crate::answer::AnswerEntry;
use crate::Result;
use alloy::primitives::{hex, B256};
use async_trait::async_trait;
use serde_json::json;

fn encode_hash(hash: B256) -> String {
    format!("0x{}", hex::encode(hash.0))
}

/// `wallet_address(signer)`
pub struct WalletAddressTool;

#[async_trait]
impl ToolHandler for WalletAddressTool {
    async fn call(&self, args: ToolArgs) -> Result<String> {
        let wallet = args.signer()?;
        let entry = AnswerEntry::success(
            "Derived the address of the connected wallet",
            json!({ "address": wallet.address_string() }),
            String::new(),
        );
        Ok(entry.to_tool_output())
    }
}

/// `sign_message(message, signer)`; EIP-191 personal message
pub struct SignMessageTool;

#[async_trait]
impl ToolHandler for SignMessageTool {
    async fn call(&self, args: ToolArgs) -> Result<String> {
        let message = args.require_str(0, "message")?;
        let wallet = args.signer()?;

        let signed = wallet.sign_message(&message)?;
        tracing::info!(address = %wallet.address_string(), "Signed message");

        let entry = AnswerEntry::success(
            "Signed the message with the connected wallet",
            json!({
                "address": wallet.address_string(),
                "message": message,
                "message_hash": encode_hash(signed.message_hash),
                "signature": signed.signature,
            }),
            String::new(),
        );
        Ok(entry.to_tool_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerEntry;
    use crate::testing::{TEST_ADDRESS, TEST_KEY};
    use crate::wallet::SecureWallet;
    use crate::Error;
    use secrecy::SecretString;
    use std::sync::Arc;

    fn wallet() -> Arc<SecureWallet> {
        Arc::new(SecureWallet::from_secret(&SecretString::from(TEST_KEY.to_string())).unwrap())
    }

    fn decode(output: &str) -> AnswerEntry {
        let mut entries: Vec<AnswerEntry> = serde_json::from_str(output).unwrap();
        assert_eq!(entries.len(), 1);
        entries.remove(0)
    }

    #[tokio::test]
    async fn address_comes_from_signer() {
        let output = WalletAddressTool
            .call(ToolArgs::new(vec![]).with_signer(wallet()))
            .await
            .unwrap();
        let entry = decode(&output);
        assert!(entry.is_success());
        assert_eq!(
            serde_json::to_value(&entry.response).unwrap()["address"],
            TEST_ADDRESS
        );
    }

    #[tokio::test]
    async fn signs_with_eip191_hash() {
        let output = SignMessageTool
            .call(ToolArgs::new(vec![json!("hello")]).with_signer(wallet()))
            .await
            .unwrap();
        let response = serde_json::to_value(&decode(&output).response).unwrap();

        // keccak256("\x19Ethereum Signed Message:\n5hello")
        assert_eq!(
            response["message_hash"],
            "0x50b2c43fd39106bafbba0da34fc430e1f91e3c96ea2acee2bc34119f92b37750"
        );
        assert_eq!(response["signature"].as_str().unwrap().len(), 132);
    }

    #[tokio::test]
    async fn signing_without_wallet_fails() {
        let err = SignMessageTool
            .call(ToolArgs::new(vec![json!("hello")]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::WalletNotConnected(_)));
    }
}
