//! Wallet session establishment

use super::{WalletError, WalletProvider};
use alloy_primitives::Address;
use std::fmt;
use std::sync::Arc;

/// Signing authority bound to one account on one chain
#[derive(Clone)]
pub struct SigningContext {
    provider: Arc<dyn WalletProvider>,
    account: Address,
    chain_id: u64,
}

impl SigningContext {
    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// An authorized wallet session.
///
/// There is no way to hold an address without its signing context or the
/// other way round: both are created together by `SessionManager::connect`.
#[derive(Clone)]
pub struct Session {
    signer: SigningContext,
}

impl Session {
    pub fn new(provider: Arc<dyn WalletProvider>, account: Address, chain_id: u64) -> Self {
        Self {
            signer: SigningContext {
                provider,
                account,
                chain_id,
            },
        }
    }

    pub fn address(&self) -> Address {
        self.signer.account()
    }

    pub fn signer(&self) -> &SigningContext {
        &self.signer
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.signer.account)
            .field("chain_id", &self.signer.chain_id)
            .finish_non_exhaustive()
    }
}

/// Establishes sessions against the injected provider, if there is one
pub struct SessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    chain_id: u64,
}

impl SessionManager {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, chain_id: u64) -> Self {
        Self { provider, chain_id }
    }

    /// Whether a provider capability is present at all
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Request authorization and bind a fresh session to the first account.
    ///
    /// No chain-switch request is made: the session is scoped to the target
    /// chain id whatever network the wallet currently has selected.
    pub async fn connect(&self) -> Result<Session, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::Unavailable)?;

        let granted = provider.request_accounts().await?;
        tracing::debug!(count = granted.len(), "Wallet granted accounts");

        // The signer is the wallet's first enumerated account; fall back to
        // the grant list for wallets that do not implement eth_accounts.
        let enumerated = match provider.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::debug!(error = %e, "eth_accounts failed, using granted accounts");
                Vec::new()
            }
        };
        let Some(address) = enumerated.first().or(granted.first()).copied() else {
            return Err(WalletError::UserRejected(
                "wallet authorized no accounts".to_string(),
            ));
        };

        tracing::info!(address = %address, chain_id = self.chain_id, "Wallet session established");
        Ok(Session::new(provider.clone(), address, self.chain_id))
    }
}
