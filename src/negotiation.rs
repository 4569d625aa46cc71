//! Negotiation backend client
//!
//! The backend is a stateless request/response endpoint: every user message
//! is sent on its own, annotated with the sender's wallet address, and the
//! last fragment of the answer is the agent's reply.

mod client;
mod error;
mod types;

pub use client::NegotiationService;
pub use error::NegotiationError;
pub use types::{build_prompt, NegotiationRequest, NegotiationResponse};

use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything that can carry one user message to the agent and return its reply
#[async_trait]
pub trait Negotiator: Send + Sync {
    async fn send(&self, address: Address, text: &str) -> Result<String, NegotiationError>;

    /// Endpoint description for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: Negotiator + ?Sized> Negotiator for Arc<T> {
    async fn send(&self, address: Address, text: &str) -> Result<String, NegotiationError> {
        (**self).send(address, text).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for negotiators
pub struct LoggingNegotiator<N> {
    inner: N,
}

impl<N: Negotiator> LoggingNegotiator<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: Negotiator> Negotiator for LoggingNegotiator<N> {
    async fn send(&self, address: Address, text: &str) -> Result<String, NegotiationError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(address, text).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    address = %address,
                    duration_ms = %duration.as_millis(),
                    reply_len = reply.len(),
                    "Negotiation exchange completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    address = %address,
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    retryable = e.kind().is_retryable(),
                    "Negotiation exchange failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
