//! Agnetic - offering & negotiation client
//!
//! Connects a wallet, submits the fixed ETH offering to the deposit contract
//! and relays chat messages to the Agnetic negotiation agent.

mod chain;
mod config;
mod console;
mod error;
mod negotiation;
mod runtime;
mod state_machine;
mod wallet;

use chain::contracts::TARGET_CHAIN_ID;
use chain::{HttpTransport, RpcChainReader};
use config::Config;
use negotiation::{LoggingNegotiator, NegotiationService};
use runtime::{OrchestratorRuntime, ProductionRuntime};
use state_machine::AppContext;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet::{DepositSubmitter, Eip1193Bridge, SessionManager, WalletProvider};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the console
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agnetic=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        rpc_url = %config.rpc_url,
        agent_url = %config.agent_url,
        token = %config.contracts.token,
        deposit = %config.contracts.deposit,
        "Configuration loaded"
    );

    // Chain reads
    let chain = RpcChainReader::new(
        HttpTransport::new(config.rpc_url.clone(), config.rpc_timeout)?,
        config.contracts,
    );

    // Injected wallet, if configured
    let provider: Option<Arc<dyn WalletProvider>> = match &config.wallet_url {
        Some(url) => {
            tracing::info!(url = %url, "Using injected wallet bridge");
            let transport = HttpTransport::new(url.clone(), config.confirmation_timeout)?;
            Some(Arc::new(Eip1193Bridge::new(transport)))
        }
        None => {
            tracing::warn!("No wallet provider configured. Set AGNETIC_WALLET_URL to connect.");
            None
        }
    };
    let sessions = SessionManager::new(provider, TARGET_CHAIN_ID);
    let submitter = DepositSubmitter::new(
        config.contracts.deposit,
        config.receipt_poll_interval,
        config.confirmation_timeout,
    );

    // Negotiation backend
    let negotiator = LoggingNegotiator::new(NegotiationService::new(
        config.agent_url.clone(),
        config.agent_timeout,
    )?);

    let context = AppContext::new(TARGET_CHAIN_ID, submitter.offering());
    let (runtime, handle): (ProductionRuntime, _) =
        OrchestratorRuntime::new(context, sessions, submitter, chain, negotiator);
    let runtime_task = tokio::spawn(runtime.run());

    let result = console::run(handle).await;
    runtime_task.abort();
    result
}
