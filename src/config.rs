//! Runtime configuration from the environment

use crate::chain::contracts::{DEPOSIT_ADDRESS, TOKEN_ADDRESS};
use crate::chain::Contracts;
use alloy_primitives::Address;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RPC_URL: &str = "https://rpc.sepolia.org";
const DEFAULT_AGENT_URL: &str = "http://localhost:3000/api/agent";
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_RECEIPT_POLL_MS: u64 = 2_000;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 600;
/// Chain reads are small; they get their own short timeout
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    /// Injected wallet bridge; `None` means no provider is available
    pub wallet_url: Option<String>,
    pub agent_url: String,
    pub agent_timeout: Duration,
    pub rpc_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub confirmation_timeout: Duration,
    pub contracts: Contracts,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or unparsable values fall back to
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| match v.trim().parse::<u64>() {
                    Ok(n) => Some(n),
                    Err(e) => {
                        tracing::warn!(key, value = %v, error = %e, "Ignoring invalid number");
                        None
                    }
                })
                .unwrap_or(default)
        };
        let address = |key: &str, default: Address| {
            non_empty(key)
                .and_then(|v| match Address::from_str(v.trim()) {
                    Ok(a) => Some(a),
                    Err(e) => {
                        tracing::warn!(key, value = %v, error = %e, "Ignoring invalid address");
                        None
                    }
                })
                .unwrap_or(default)
        };

        Self {
            rpc_url: non_empty("AGNETIC_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            wallet_url: non_empty("AGNETIC_WALLET_URL"),
            agent_url: non_empty("AGNETIC_AGENT_URL")
                .unwrap_or_else(|| DEFAULT_AGENT_URL.to_string()),
            agent_timeout: Duration::from_secs(number(
                "AGNETIC_AGENT_TIMEOUT_SECS",
                DEFAULT_AGENT_TIMEOUT_SECS,
            )),
            rpc_timeout: RPC_TIMEOUT,
            receipt_poll_interval: Duration::from_millis(number(
                "AGNETIC_RECEIPT_POLL_MS",
                DEFAULT_RECEIPT_POLL_MS,
            )),
            confirmation_timeout: Duration::from_secs(number(
                "AGNETIC_CONFIRMATION_TIMEOUT_SECS",
                DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            )),
            contracts: Contracts {
                token: address("AGNETIC_TOKEN_ADDRESS", TOKEN_ADDRESS),
                deposit: address("AGNETIC_DEPOSIT_ADDRESS", DEPOSIT_ADDRESS),
            },
        }
    }
}
