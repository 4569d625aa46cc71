//! Failure taxonomy shared by every component
//!
//! Component errors (`WalletError`, `RpcError`, `NegotiationError`) each
//! classify themselves into one of these kinds so the state machine and the
//! presenter can reason about failures without knowing where they came from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a failed action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No wallet provider capability is present
    WalletUnavailable,
    /// The user declined the request in the wallet
    UserRejected,
    /// Node or transport failure reading or writing chain state
    Rpc,
    /// The deposit transaction executed and reverted on-chain
    RevertedTransaction,
    /// Negotiation backend unreachable or returned a non-success status
    Network,
    /// Negotiation backend answered with a body we cannot use
    MalformedResponse,
}

impl ErrorKind {
    /// Whether re-triggering the same action can reasonably succeed.
    ///
    /// Nothing in this crate retries automatically; the presenter uses this
    /// to phrase the notice.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Rpc | Self::Network | Self::MalformedResponse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WalletUnavailable => "wallet_unavailable",
            Self::UserRejected => "user_rejected",
            Self::Rpc => "rpc",
            Self::RevertedTransaction => "reverted_transaction",
            Self::Network => "network",
            Self::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure as recorded in application state and shown to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorNotice {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
