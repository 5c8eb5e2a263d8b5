//! Argument resolution
//!
//! Turns the loosely-typed token list a model produced for one tool call
//! into the positional [`ToolArgs`] the handler expects. Resolution is pure:
//! the same tokens, descriptor and caller context always yield the same
//! arguments.

mod coerce;
mod token;

pub use coerce::TypeSniffer;
pub use token::{is_placeholder, normalize_placeholder, ArgumentToken};

use crate::tools::{ToolArgs, ToolDescriptor};
use crate::wallet::CallerContext;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

#[derive(Default)]
pub struct ArgumentResolver {
    sniffer: TypeSniffer,
}

/// Tokens sorted into name-bound and positional values
#[derive(Debug, Default)]
struct Collected {
    named: HashMap<String, Value>,
    positional: VecDeque<Value>,
}

impl ArgumentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        tool: &ToolDescriptor,
        raw_args: &[Value],
        ctx: &CallerContext,
    ) -> Result<ToolArgs> {
        let mut collected = Collected::default();
        for raw in raw_args {
            self.collect(tool, ArgumentToken::classify(raw), ctx, &mut collected)?;
        }
        self.bind(tool, collected, ctx)
    }

    fn collect(
        &self,
        tool: &ToolDescriptor,
        token: ArgumentToken,
        ctx: &CallerContext,
        out: &mut Collected,
    ) -> Result<()> {
        match token {
            ArgumentToken::Named { name, value, raw } => {
                if tool.has_parameter(&name) {
                    let bound = if is_placeholder(&value) {
                        Value::String(ctx.signer_address()?)
                    } else {
                        self.sniffer.sniff(&value)
                    };
                    out.named.insert(name, bound);
                } else {
                    tracing::debug!(
                        tool = %tool.name,
                        name = %name,
                        "Undeclared named argument, binding positionally"
                    );
                    out.positional.push_back(Value::String(raw));
                }
            }
            ArgumentToken::Placeholder(_) => {
                out.positional.push_back(Value::String(ctx.signer_address()?));
            }
            ArgumentToken::Envelope { function, args } => {
                if function.trim() != tool.name {
                    tracing::debug!(
                        tool = %tool.name,
                        envelope = %function,
                        "Envelope names a different function"
                    );
                }
                for arg in &args {
                    self.collect(tool, ArgumentToken::classify(arg), ctx, out)?;
                }
            }
            ArgumentToken::Json(value) | ArgumentToken::Scalar(value) => {
                out.positional.push_back(value);
            }
        }
        Ok(())
    }

    fn bind(
        &self,
        tool: &ToolDescriptor,
        mut collected: Collected,
        ctx: &CallerContext,
    ) -> Result<ToolArgs> {
        let mut values = Vec::with_capacity(tool.parameters.len());
        let mut signer_required = None;

        for param in &tool.parameters {
            if param.is_signer() {
                signer_required = Some(param.required);
                continue;
            }

            let value = collected
                .named
                .remove(&param.name)
                .or_else(|| collected.positional.pop_front())
                .unwrap_or(Value::Null);

            if value.is_null() && param.required {
                return Err(Error::MissingParameter(param.name.clone()));
            }
            values.push(value);
        }

        if !collected.positional.is_empty() {
            tracing::debug!(
                tool = %tool.name,
                dropped = collected.positional.len(),
                "Dropping surplus positional arguments"
            );
        }

        let mut args = ToolArgs::new(values);
        match (signer_required, ctx.signer()) {
            (Some(_), Some(signer)) => args = args.with_signer(signer.clone()),
            (Some(true), None) => {
                return Err(Error::WalletNotConnected(format!(
                    "{} needs a signing wallet. Please connect your wallet.",
                    tool.name
                )));
            }
            _ => {}
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{handler_fn, ParamType, ParameterSpec, ToolRegistry};
    use crate::wallet::SecureWallet;
    use futures::FutureExt;
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::Arc;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn registry() -> ToolRegistry {
        let noop = || handler_fn(|_args: ToolArgs| async { Ok::<_, Error>(String::new()) }.boxed());
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "transfer",
                "Send tokens",
                vec![
                    ParameterSpec::required("recipient", ParamType::Address, "Destination"),
                    ParameterSpec::required("amount", ParamType::Number, "Amount"),
                    ParameterSpec::optional("network", ParamType::String, "Chain"),
                    ParameterSpec::signer(),
                ],
                noop(),
            )
            .unwrap();
        registry
            .register(
                "get_balance",
                "Balance of an address",
                vec![
                    ParameterSpec::required("address", ParamType::Address, "Holder"),
                    ParameterSpec::optional("network", ParamType::String, "Chain"),
                ],
                noop(),
            )
            .unwrap();
        registry
    }

    fn signer_ctx() -> CallerContext {
        let wallet = SecureWallet::from_secret(&SecretString::from(TEST_KEY.to_string())).unwrap();
        CallerContext::with_signer(Arc::new(wallet))
    }

    #[test]
    fn named_amount_binds_regardless_of_position() {
        let registry = registry();
        let tool = registry.get("transfer").unwrap();
        let args = ArgumentResolver::new()
            .resolve(tool, &[json!("amount=500"), json!("0xdead")], &signer_ctx())
            .unwrap();

        assert_eq!(args.values(), &[json!("0xdead"), json!(500), Value::Null]);
        assert!(args.has_signer());
    }

    #[test]
    fn named_amount_keeps_full_decimal_precision() {
        let registry = registry();
        let tool = registry.get("transfer").unwrap();
        let args = ArgumentResolver::new()
            .resolve(
                tool,
                &[json!("0xdead"), json!("amount=1.000000000000000001")],
                &signer_ctx(),
            )
            .unwrap();

        assert_eq!(args.str(1).as_deref(), Some("1.000000000000000001"));
    }

    #[test]
    fn placeholder_resolves_to_signer_address() {
        let registry = registry();
        let tool = registry.get("get_balance").unwrap();
        let args = ArgumentResolver::new()
            .resolve(tool, &[json!("wallet_address"), json!("base")], &signer_ctx())
            .unwrap();
        assert_eq!(args.values(), &[json!(TEST_ADDRESS), json!("base")]);
        assert!(!args.has_signer());
    }

    #[test]
    fn placeholder_without_signer_is_caller_error() {
        let registry = registry();
        let tool = registry.get("get_balance").unwrap();
        let err = ArgumentResolver::new()
            .resolve(tool, &[json!("<owner_id>")], &CallerContext::watch_only("0x1"))
            .unwrap_err();
        assert!(err.is_caller_facing());
    }

    #[test]
    fn envelope_args_are_spliced() {
        let registry = registry();
        let tool = registry.get("get_balance").unwrap();
        let raw = json!({"function": "get_balance", "args": ["address=0xabc", "optimism"]});
        let args = ArgumentResolver::new()
            .resolve(tool, &[raw], &CallerContext::anonymous())
            .unwrap();
        assert_eq!(args.values(), &[json!("0xabc"), json!("optimism")]);
    }

    #[test]
    fn missing_required_parameter_is_named() {
        let registry = registry();
        let tool = registry.get("transfer").unwrap();
        let err = ArgumentResolver::new()
            .resolve(tool, &[json!("amount=1")], &signer_ctx())
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter(ref name) if name == "recipient"));
    }

    #[test]
    fn declared_signer_requires_credential() {
        let registry = registry();
        let tool = registry.get("transfer").unwrap();
        let err = ArgumentResolver::new()
            .resolve(tool, &[json!("0xdead"), json!(1)], &CallerContext::anonymous())
            .unwrap_err();
        assert!(matches!(err, Error::WalletNotConnected(_)));
    }

    #[test]
    fn undeclared_names_stay_positional_and_surplus_is_dropped() {
        let registry = registry();
        let tool = registry.get("get_balance").unwrap();
        let args = ArgumentResolver::new()
            .resolve(
                tool,
                &[json!("holder=0xabc"), json!("base"), json!("extra")],
                &CallerContext::anonymous(),
            )
            .unwrap();
        assert_eq!(args.values(), &[json!("holder=0xabc"), json!("base")]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let registry = registry();
        let tool = registry.get("transfer").unwrap();
        let resolver = ArgumentResolver::new();
        let ctx = signer_ctx();
        let raw = [json!("network=base"), json!("my_wallet"), json!("amount=0.5")];

        let first = resolver.resolve(tool, &raw, &ctx).unwrap();
        let second = resolver.resolve(tool, &raw, &ctx).unwrap();
        assert_eq!(first.values(), second.values());
        assert_eq!(
            first.values(),
            &[json!(TEST_ADDRESS), json!(0.5), json!("base")]
        );
    }
}
