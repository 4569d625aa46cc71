//! Injected wallet provider
//!
//! Modelled on EIP-1193: the wallet exposes account request/enumeration and
//! signs transactions on behalf of the user. `Eip1193Bridge` speaks to such a
//! wallet over JSON-RPC (a browser-extension bridge, Frame, or a dev node
//! with unlocked accounts).

use super::WalletError;
use crate::chain::contracts::{decode_quantity, to_hex_data, to_quantity};
use crate::chain::{RpcError, RpcTransport};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::str::FromStr;

/// A transaction for the wallet to sign and broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl TransactionRequest {
    pub fn to_json(&self) -> Value {
        json!({
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "value": to_quantity(self.value),
            "data": to_hex_data(&self.data),
            "chainId": format!("0x{:x}", self.chain_id),
        })
    }
}

/// A mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// `false` when execution reverted
    pub success: bool,
}

impl TransactionReceipt {
    /// Parse an `eth_getTransactionReceipt` result.
    ///
    /// Returns `None` while the transaction is not yet in a block.
    pub fn from_json(value: &Value) -> Result<Option<Self>, RpcError> {
        if value.is_null() {
            return Ok(None);
        }
        let Some(block_number) = value.get("blockNumber").and_then(Value::as_str) else {
            return Ok(None);
        };

        let block_number = u64::try_from(decode_quantity(block_number)?)
            .map_err(|e| RpcError::decode(format!("blockNumber out of range: {e}")))?;
        let hash = value
            .get("transactionHash")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::decode("receipt missing transactionHash"))?;
        let transaction_hash =
            B256::from_str(hash).map_err(|e| RpcError::decode(format!("{e}: {hash}")))?;
        // Receipts without a status field predate Byzantium; treat as success
        let success = match value.get("status").and_then(Value::as_str) {
            Some(status) => !decode_quantity(status)?.is_zero(),
            None => true,
        };

        Ok(Some(Self {
            transaction_hash,
            block_number,
            success,
        }))
    }
}

/// The injected wallet capability
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to authorize accounts (`eth_requestAccounts`)
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Accounts already authorized (`eth_accounts`)
    async fn accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Sign and broadcast, returning the transaction hash
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256, WalletError>;

    /// Receipt for a transaction, `None` while pending
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, WalletError>;
}

/// EIP-1193 wallet reached over JSON-RPC
pub struct Eip1193Bridge<T> {
    transport: T,
}

impl<T: RpcTransport> Eip1193Bridge<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: RpcTransport> WalletProvider for Eip1193Bridge<T> {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let result = self
            .transport
            .request("eth_requestAccounts", json!([]))
            .await?;
        Ok(parse_accounts(&result)?)
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        let result = self.transport.request("eth_accounts", json!([])).await?;
        Ok(parse_accounts(&result)?)
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256, WalletError> {
        let result = self
            .transport
            .request("eth_sendTransaction", json!([request.to_json()]))
            .await?;
        let hash = result
            .as_str()
            .ok_or_else(|| RpcError::decode(format!("eth_sendTransaction returned {result}")))?;
        Ok(B256::from_str(hash).map_err(|e| RpcError::decode(format!("{e}: {hash}")))?)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        let result = self
            .transport
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await?;
        Ok(TransactionReceipt::from_json(&result)?)
    }
}

fn parse_accounts(value: &Value) -> Result<Vec<Address>, RpcError> {
    let list = value
        .as_array()
        .ok_or_else(|| RpcError::decode(format!("expected account list, got {value}")))?;
    list.iter()
        .map(|entry| {
            let raw = entry
                .as_str()
                .ok_or_else(|| RpcError::decode(format!("account is not a string: {entry}")))?;
            Address::from_str(raw).map_err(|e| RpcError::decode(format!("{e}: {raw}")))
        })
        .collect()
}
