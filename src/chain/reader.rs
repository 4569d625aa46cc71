//! Balance reads against a JSON-RPC node

use super::contracts::{self, Contracts};
use super::{Amount, BalanceReadings, RpcError, RpcTransport};
use alloy_primitives::{Address, U256};
use serde_json::{json, Value};

/// Reads the three offering balances for an address
pub struct RpcChainReader<T> {
    transport: T,
    contracts: Contracts,
}

impl<T: RpcTransport> RpcChainReader<T> {
    pub fn new(transport: T, contracts: Contracts) -> Self {
        Self {
            transport,
            contracts,
        }
    }

    /// Native ETH balance
    pub async fn native_balance(&self, owner: Address) -> Result<Amount, RpcError> {
        let result = self
            .transport
            .request("eth_getBalance", json!([owner.to_string(), "latest"]))
            .await?;
        let raw = contracts::decode_quantity(expect_str(&result, "eth_getBalance")?)?;
        Ok(Amount::ether(raw))
    }

    /// AgneticGOD token balance
    pub async fn token_balance(&self, owner: Address) -> Result<Amount, RpcError> {
        let raw = self
            .call_uint(self.contracts.token, contracts::BALANCE_OF, owner)
            .await?;
        Ok(Amount::ether(raw))
    }

    /// Amount the owner has offered into the deposit contract
    pub async fn deposit_balance(&self, owner: Address) -> Result<Amount, RpcError> {
        let raw = self
            .call_uint(self.contracts.deposit, contracts::DEPOSITS_OF, owner)
            .await?;
        Ok(Amount::ether(raw))
    }

    /// Issue all three reads concurrently.
    ///
    /// Every read is attempted regardless of the others. A failed ledger read
    /// is reported as zero so the offering display never blocks on it.
    pub async fn read_balances(&self, owner: Address) -> BalanceReadings {
        let (eth, token, deposit) = futures::join!(
            self.native_balance(owner),
            self.token_balance(owner),
            self.deposit_balance(owner),
        );

        let deposit = deposit.unwrap_or_else(|e| {
            tracing::warn!(address = %owner, error = %e, "Deposit ledger read failed, showing zero");
            Amount::zero()
        });

        if let Err(e) = &eth {
            tracing::error!(address = %owner, error = %e, "ETH balance read failed");
        }
        if let Err(e) = &token {
            tracing::error!(address = %owner, error = %e, "Token balance read failed");
        }

        BalanceReadings {
            eth,
            token,
            deposit,
        }
    }

    async fn call_uint(
        &self,
        to: Address,
        signature: &str,
        owner: Address,
    ) -> Result<U256, RpcError> {
        let data = contracts::to_hex_data(&contracts::encode_call(signature, &[owner]));
        let result = self
            .transport
            .request(
                "eth_call",
                json!([{ "to": to.to_string(), "data": data }, "latest"]),
            )
            .await?;
        contracts::decode_uint(expect_str(&result, "eth_call")?)
    }
}

fn expect_str<'a>(value: &'a Value, method: &str) -> Result<&'a str, RpcError> {
    match value {
        Value::String(s) => Ok(s),
        // Some nodes answer `null` instead of `0x` for empty returns
        Value::Null => Ok("0x"),
        other => Err(RpcError::decode(format!(
            "{method} returned non-string result: {other}"
        ))),
    }
}
