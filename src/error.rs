//! Error types for the on-chain query agent

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("decomposition failed: {0}")]
    Decomposition(String),

    #[error("tool selection failed: {0}")]
    Selection(String),

    #[error("invalid subquery plan at index {index}: {reason}")]
    InvalidPlan { index: usize, reason: String },

    #[error("Tool {0} not found")]
    ToolNotFound(String),

    #[error("Tool {0} is already registered")]
    DuplicateTool(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Wallet not connected: {0}")]
    WalletNotConnected(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Tool {tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Failed to parse answer: {0}")]
    AnswerParse(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where in the pipeline a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The completion service returned malformed or contract-violating output.
    UpstreamModel,
    /// An argument could not be coerced or a required parameter is missing.
    Resolution,
    /// The tool handler itself failed.
    ToolExecution,
    /// A tool needed a signing credential the caller did not supply.
    CallerContext,
    /// Local misconfiguration or I/O.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Llm(_)
            | Error::Decomposition(_)
            | Error::Selection(_)
            | Error::InvalidPlan { .. }
            | Error::AnswerParse(_) => ErrorKind::UpstreamModel,
            Error::ToolNotFound(_) | Error::MissingParameter(_) | Error::InvalidArgument(_) => {
                ErrorKind::Resolution
            }
            Error::WalletNotConnected(_) => ErrorKind::CallerContext,
            Error::ToolExecution(_) | Error::Timeout { .. } | Error::Network(_) => {
                ErrorKind::ToolExecution
            }
            Error::DuplicateTool(_) | Error::Wallet(_) | Error::Config(_) | Error::Json(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Errors the caller can fix themselves (e.g. by connecting a wallet).
    pub fn is_caller_facing(&self) -> bool {
        self.kind() == ErrorKind::CallerContext
    }
}

pub type Result<T> = std::result::Result<T, Error>;
