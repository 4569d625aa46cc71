//! HTTP negotiation client

use super::{NegotiationError, NegotiationRequest, NegotiationResponse, Negotiator};
use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Talks to the negotiation endpoint over HTTP POST
pub struct NegotiationService {
    client: Client,
    endpoint: String,
}

impl NegotiationService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, NegotiationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NegotiationError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Negotiator for NegotiationService {
    async fn send(&self, address: Address, text: &str) -> Result<String, NegotiationError> {
        let request = NegotiationRequest::new(address, text);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NegotiationError::Network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    NegotiationError::Network(format!("Connection failed: {e}"))
                } else {
                    NegotiationError::Network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NegotiationError::Network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(NegotiationError::Network(format!("HTTP {status}: {text}")));
        }

        let parsed: NegotiationResponse = serde_json::from_str(&text).map_err(|e| {
            NegotiationError::MalformedResponse(format!("{e} - body: {text}"))
        })?;
        parsed.into_reply()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
