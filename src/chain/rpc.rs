//! JSON-RPC transport
//!
//! Both the chain node and the injected wallet provider speak JSON-RPC 2.0,
//! so they share this transport. Tests swap in a scripted transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// EIP-1193 "user rejected request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Failure talking to a JSON-RPC endpoint
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RpcError {
    /// JSON-RPC error code, when the node answered with one
    pub code: Option<i64>,
    pub message: String,
}

impl RpcError {
    /// The request never produced a JSON-RPC answer
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// The endpoint answered with a JSON-RPC error object
    pub fn node(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// The answer arrived but could not be interpreted
    pub fn decode(message: impl Into<String>) -> Self {
        Self::transport(format!("Failed to decode result: {}", message.into()))
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

/// A JSON-RPC endpoint
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Issue one request and return its `result` member
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        (**self).request(method, params).await
    }
}

/// JSON-RPC over HTTP POST
pub struct HttpTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        tracing::debug!(url = %self.url, method, id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    RpcError::transport(format!("Connection failed: {e}"))
                } else {
                    RpcError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(RpcError::transport(format!("HTTP {status}: {text}")));
        }

        let parsed: JsonRpcResponse = serde_json::from_str(&text)
            .map_err(|e| RpcError::decode(format!("{e} - body: {text}")))?;
        parsed.into_result()
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, RpcError> {
        if let Some(err) = self.error {
            return Err(RpcError::node(err.code, err.message));
        }
        // A missing result is a legitimate `null` (e.g. receipt not mined yet)
        Ok(self.result.unwrap_or(Value::Null))
    }
}
