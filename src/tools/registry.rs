//! Tool registry
//!
//! Write-once, read-many catalog of callable tools. The registry is filled
//! while the agent is being built and is shared read-only (behind `Arc`)
//! afterwards, so concurrent pipeline invocations can look tools up freely.

use super::ToolArgs;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Semantic type of a tool parameter, as shown to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Address,
    Object,
    Array,
    /// The caller's signing credential. Never supplied by the model.
    Signer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    /// The trailing signing-credential parameter
    pub fn signer() -> Self {
        Self::required(
            "signer",
            ParamType::Signer,
            "Signing wallet of the caller (supplied by the agent)",
        )
    }

    pub fn is_signer(&self) -> bool {
        self.param_type == ParamType::Signer
    }
}

/// Async callable behind a tool.
///
/// The returned string is a JSON-encoded single-element array in the answer
/// envelope shape (see [`crate::answer::AnswerEntry::to_tool_output`]).
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: ToolArgs) -> Result<String>;
}

/// Adapter turning a closure into a [`ToolHandler`]
pub struct FnHandler<F>(F);

/// Wrap a closure returning a boxed future as a tool handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(ToolArgs) -> BoxFuture<'static, Result<String>> + Send + Sync,
{
    FnHandler(f)
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(ToolArgs) -> BoxFuture<'static, Result<String>> + Send + Sync,
{
    async fn call(&self, args: ToolArgs) -> Result<String> {
        (self.0)(args).await
    }
}

pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name && !p.is_signer())
    }

    pub fn declares_signer(&self) -> bool {
        self.parameters.iter().any(ParameterSpec::is_signer)
    }

    /// Model-facing description; signer parameters are hidden.
    pub fn catalog_entry(&self) -> Value {
        let parameters: Vec<&ParameterSpec> =
            self.parameters.iter().filter(|p| !p.is_signer()).collect();
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": parameters,
        })
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tool to the catalog.
    ///
    /// Names must be unique. A duplicate is refused with
    /// [`Error::DuplicateTool`]; the existing entry is left untouched.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        parameters: Vec<ParameterSpec>,
        handler: impl ToolHandler + 'static,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("tool name must not be empty".into()));
        }
        if self.get(name).is_some() {
            return Err(Error::DuplicateTool(name.to_string()));
        }

        tracing::debug!(tool = name, params = parameters.len(), "Registered tool");
        self.tools.push(ToolDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Look up by exact name after trimming whitespace
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        let name = name.trim();
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn all(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Catalog rendered for prompt construction
    pub fn catalog_json(&self) -> Value {
        Value::Array(self.tools.iter().map(ToolDescriptor::catalog_entry).collect())
    }
}
