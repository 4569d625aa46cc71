//! Wallet error types

use crate::chain::RpcError;
use crate::error::ErrorKind;
use alloy_primitives::B256;
use thiserror::Error;

/// Failure connecting the wallet or submitting the deposit
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet provider available")]
    Unavailable,
    #[error("Request rejected in wallet: {0}")]
    UserRejected(String),
    #[error("Deposit transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },
    #[error(transparent)]
    Rpc(RpcError),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Unavailable => ErrorKind::WalletUnavailable,
            WalletError::UserRejected(_) => ErrorKind::UserRejected,
            WalletError::Reverted { .. } => ErrorKind::RevertedTransaction,
            WalletError::Rpc(_) => ErrorKind::Rpc,
        }
    }
}

impl From<RpcError> for WalletError {
    /// EIP-1193 code 4001 is the wallet UI's "reject" button
    fn from(err: RpcError) -> Self {
        if err.is_user_rejection() {
            WalletError::UserRejected(err.message)
        } else {
            WalletError::Rpc(err)
        }
    }
}
