//! Caller identity and signing credentials
//!
//! The private key never leaves this module. Everything else sees a
//! [`CallerContext`], which exposes the derived address and hands the wallet
//! only to tools that declare a signer parameter.

mod context;
mod signer;

pub use context::CallerContext;
pub use signer::{MessageSignature, SecureWallet};
