//! Negotiation error types

use crate::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NegotiationError {
    /// Unreachable, timed out, or answered with a non-success status
    #[error("Negotiation backend unavailable: {0}")]
    Network(String),
    #[error("Malformed negotiation response: {0}")]
    MalformedResponse(String),
}

impl NegotiationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NegotiationError::Network(_) => ErrorKind::Network,
            NegotiationError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}
