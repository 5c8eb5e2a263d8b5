//! On-chain Query Agent
//!
//! A tool-calling agent that answers natural-language blockchain questions:
//! - Decomposes the query into subqueries with an LLM
//! - Selects tools and arguments per subquery from the registered catalog
//! - Resolves arguments and executes the tools against chain RPCs
//! - Synthesizes the tool outputs into a structured final answer
//!
//! # Security Model
//!
//! - Private keys never leave the wallet module
//! - Only tools declaring a signer parameter receive the caller's wallet
//! - Tool calls are never retried; optional audit trail of tool and LLM calls

pub mod agent;
pub mod answer;
pub mod audit;
pub mod config;
pub mod executor;
pub mod json_repair;
pub mod llm;
pub mod resolver;
pub mod tokens;
pub mod tools;
pub mod wallet;

mod error;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use agent::Agent;
pub use answer::{AnswerEntry, AnswerStatus, FinalAnswer, StructuredError};
pub use config::{Config, Network, RpcConfig, LLM_API_KEY_ENV};
pub use error::{Error, ErrorKind, Result};
pub use executor::{ExecutionResult, ToolExecutor};
pub use wallet::{CallerContext, SecureWallet};
