//! On-chain Query Agent CLI
//!
//! Command-line interface for asking the agent blockchain questions.

use clap::{Parser, Subcommand};
use onchain_query_agent::llm::OpenAiCompatibleClient;
use onchain_query_agent::tools::{register_builtin_tools, ToolRegistry};
use onchain_query_agent::{Agent, CallerContext, Config, Error, Result, RpcConfig, SecureWallet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "onchain-agent")]
#[command(about = "LLM-driven agent for on-chain queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a natural-language query
    Ask {
        /// The question, e.g. "what is the ETH balance of vitalik.eth's wallet on base"
        query: String,

        /// Watch-only caller address (ignored when PRIVATE_KEY is set)
        #[arg(short, long)]
        address: Option<String>,
    },

    /// List the registered tools as JSON
    Tools,

    /// Show current configuration (secrets omitted)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr; stdout carries the answer JSON
    let (plain, json) = if cli.json_logs {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    tracing_subscriber::registry()
        .with(plain)
        .with(json)
        .with(filter)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Ask { query, address } => {
            run_ask(config, &query, address).await?;
        }
        Commands::Tools => {
            let registry = build_registry(&config)?;
            println!("{}", serde_json::to_string_pretty(&registry.catalog_json())?);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn build_registry(config: &Config) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(
        &mut registry,
        RpcConfig::from_env(),
        config.agent.default_network,
    )?;
    Ok(registry)
}

fn caller_context(address: Option<String>) -> Result<CallerContext> {
    if std::env::var(PRIVATE_KEY_ENV).is_ok() {
        let wallet = SecureWallet::from_env(PRIVATE_KEY_ENV)?;
        tracing::info!(address = %wallet.address_string(), "Loaded wallet from PRIVATE_KEY");
        return Ok(CallerContext::with_signer(Arc::new(wallet)));
    }

    match address {
        Some(address) => Ok(CallerContext::watch_only(address)),
        None => {
            tracing::warn!("No PRIVATE_KEY set - wallet tools are unavailable");
            Ok(CallerContext::anonymous())
        }
    }
}

async fn run_ask(config: Config, query: &str, address: Option<String>) -> Result<()> {
    if config.llm.api_key.is_none() {
        return Err(Error::Config(format!(
            "{} not set. Required to call the completion service.",
            onchain_query_agent::LLM_API_KEY_ENV
        )));
    }

    let ctx = caller_context(address)?;
    let registry = build_registry(&config)?;
    let llm = Arc::new(OpenAiCompatibleClient::new(&config.llm)?);

    tracing::info!(
        model = %config.llm.model,
        network = config.agent.default_network.name(),
        tools = registry.len(),
        "Starting query"
    );

    let agent = Agent::new(config.agent, llm, registry);
    let answer = agent.process_user_query_pipeline(query, &ctx).await;

    println!("{}", serde_json::to_string_pretty(&answer)?);
    Ok(())
}
