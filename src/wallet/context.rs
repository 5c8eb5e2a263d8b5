//! Per-request caller context
//!
//! Owned by whoever calls the pipeline (CLI, HTTP handler). One context per
//! end user; it is never cached process-wide.

use super::SecureWallet;
use crate::{Error, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    signer: Option<Arc<SecureWallet>>,
    /// Watch-only address used for prompts when no signer is connected
    address: Option<String>,
}

impl CallerContext {
    /// Context with no identity at all
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context backed by a signing credential
    pub fn with_signer(signer: Arc<SecureWallet>) -> Self {
        Self {
            signer: Some(signer),
            address: None,
        }
    }

    /// Context that only knows the caller's public address
    pub fn watch_only(address: impl Into<String>) -> Self {
        Self {
            signer: None,
            address: Some(address.into()),
        }
    }

    pub fn signer(&self) -> Option<&Arc<SecureWallet>> {
        self.signer.as_ref()
    }

    /// Public address of the caller, derived from the signer when present
    pub fn address(&self) -> Option<String> {
        self.signer
            .as_ref()
            .map(|w| w.address_string())
            .or_else(|| self.address.clone())
    }

    /// Address derived from the active credential.
    ///
    /// A watch-only address does not count: acting on behalf of the caller
    /// requires a connected wallet.
    pub fn signer_address(&self) -> Result<String> {
        self.signer
            .as_ref()
            .map(|w| w.address_string())
            .ok_or_else(|| {
                Error::WalletNotConnected(
                    "Wallet address required but not provided. Please connect your wallet."
                        .to_string(),
                )
            })
    }
}
