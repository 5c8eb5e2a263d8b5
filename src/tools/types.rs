//! Positional arguments handed to tool handlers.

use crate::wallet::SecureWallet;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Resolved, ordered arguments for one tool call.
///
/// `values` has one slot per non-signer parameter, in declaration order.
/// Optional parameters the model did not supply hold `Value::Null`.
#[derive(Clone, Default)]
pub struct ToolArgs {
    values: Vec<Value>,
    signer: Option<Arc<SecureWallet>>,
}

impl ToolArgs {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: Arc<SecureWallet>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, treating `null` as absent
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).filter(|v| !v.is_null())
    }

    /// Value at `index` rendered as a string (numbers and booleans included)
    pub fn str(&self, index: usize) -> Option<String> {
        match self.get(index)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn require_str(&self, index: usize, name: &str) -> Result<String> {
        self.str(index)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    pub fn signer(&self) -> Result<&SecureWallet> {
        self.signer.as_deref().ok_or_else(|| {
            Error::WalletNotConnected(
                "This action needs a signing wallet. Please connect your wallet.".to_string(),
            )
        })
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }
}

impl std::fmt::Debug for ToolArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolArgs")
            .field("values", &self.values)
            .field("signer", &self.signer.as_ref().map(|w| w.address_string()))
            .finish()
    }
}
