//! Wire types for the negotiation endpoint

use super::NegotiationError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Annotate user text with the sender's address
pub fn build_prompt(address: Address, text: &str) -> String {
    format!("[wallet: {address}] {text}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationRequest {
    pub prompt: String,
}

impl NegotiationRequest {
    pub fn new(address: Address, text: &str) -> Self {
        Self {
            prompt: build_prompt(address, text),
        }
    }
}

/// Ordered reply fragments; only the last one is the agent's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationResponse {
    pub responses: Vec<String>,
}

impl NegotiationResponse {
    pub fn into_reply(mut self) -> Result<String, NegotiationError> {
        let reply = self.responses.pop().ok_or_else(|| {
            NegotiationError::MalformedResponse("response contained no fragments".to_string())
        })?;
        if !self.responses.is_empty() {
            tracing::debug!(
                discarded = self.responses.len(),
                fragments = ?self.responses,
                "Discarding intermediate reply fragments"
            );
        }
        Ok(reply)
    }
}
