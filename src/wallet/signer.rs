//! Signing credential held on behalf of one caller
//!
//! SECURITY: the private key lives only inside alloy's `PrivateKeySigner`.
//! - It is never serialized or logged
//! - Tools receive the wallet only when their schema declares a signer parameter
//! - Callers see the derived address, never the key

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::{eip191_hash_message, hex, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use secrecy::{ExposeSecret, SecretString};

/// Wallet that signs for a single end user
pub struct SecureWallet {
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
}

/// Output of an EIP-191 personal-message signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSignature {
    pub message_hash: B256,
    pub signature: String,
}

impl SecureWallet {
    /// Create a wallet from an environment variable holding a hex key
    pub fn from_env(var_name: &str) -> Result<Self> {
        let key_hex = std::env::var(var_name).map_err(|_| {
            Error::Wallet(format!(
                "Environment variable {} not set. Required for wallet initialization.",
                var_name
            ))
        })?;

        Self::from_secret(&SecretString::from(key_hex))
    }

    /// Create a wallet from a hex-encoded private key, `0x` prefix optional
    pub fn from_secret(key: &SecretString) -> Result<Self> {
        let key_hex = key.expose_secret();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        Ok(Self { signer, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Lowercase `0x`-prefixed address, the form the argument resolver emits
    pub fn address_string(&self) -> String {
        format!("0x{}", hex::encode(self.address))
    }

    /// Wallet for alloy providers that need to sign transactions
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }

    /// Sign an EIP-191 personal message
    pub fn sign_message(&self, message: &str) -> Result<MessageSignature> {
        let message_hash = eip191_hash_message(message.as_bytes());
        let signature = self
            .signer
            .sign_message_sync(message.as_bytes())
            .map_err(|e| Error::Wallet(format!("Signing failed: {}", e)))?;

        Ok(MessageSignature {
            message_hash,
            signature: signature.to_string(),
        })
    }
}

impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key, never funded on a real network.
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn wallet() -> SecureWallet {
        SecureWallet::from_secret(&SecretString::from(TEST_KEY.to_string())).unwrap()
    }

    #[test]
    fn derives_address() {
        assert_eq!(
            wallet().address_string(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn accepts_unprefixed_key() {
        let key = SecretString::from(TEST_KEY.trim_start_matches("0x").to_string());
        let wallet = SecureWallet::from_secret(&key).unwrap();
        assert_eq!(wallet.address(), self::wallet().address());
    }

    #[test]
    fn rejects_garbage_key() {
        let err = SecureWallet::from_secret(&SecretString::from("not-a-key".to_string()));
        assert!(matches!(err, Err(Error::Wallet(_))));
    }

    #[test]
    fn signs_messages_deterministically() {
        let wallet = wallet();
        let a = wallet.sign_message("hello").unwrap();
        let b = wallet.sign_message("hello").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.message_hash, eip191_hash_message(b"hello"));
    }

    #[test]
    fn debug_redacts_key() {
        let debug_str = format!("{:?}", wallet());
        assert!(!debug_str.contains("ac0974bec"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
