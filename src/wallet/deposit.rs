//! The fixed offering deposit

use super::{Session, TransactionReceipt, TransactionRequest, WalletError};
use crate::chain::contracts::{self, OFFERING_WEI};
use crate::chain::{Amount, RpcError};
use alloy_primitives::{Address, U256};
use std::time::Duration;

/// Submits the offering to the deposit contract and waits for it to be mined
pub struct DepositSubmitter {
    contract: Address,
    amount: U256,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl DepositSubmitter {
    pub fn new(contract: Address, poll_interval: Duration, confirmation_timeout: Duration) -> Self {
        Self {
            contract,
            amount: U256::from(OFFERING_WEI),
            poll_interval,
            confirmation_timeout,
        }
    }

    /// The amount every deposit carries
    pub fn offering(&self) -> Amount {
        Amount::ether(self.amount)
    }

    /// `deposit()` from the session address with the offering attached
    pub fn build_request(&self, session: &Session) -> TransactionRequest {
        TransactionRequest {
            from: session.address(),
            to: self.contract,
            value: self.amount,
            data: contracts::selector(contracts::DEPOSIT).to_vec(),
            chain_id: session.signer().chain_id(),
        }
    }

    /// Sign, broadcast and block until the transaction has one confirmation.
    ///
    /// Never retried here: a rejected or reverted deposit is reported and the
    /// user decides whether to try again.
    pub async fn submit(&self, session: &Session) -> Result<TransactionReceipt, WalletError> {
        let request = self.build_request(session);
        let provider = session.signer().provider();

        tracing::info!(
            from = %request.from,
            contract = %request.to,
            value = %self.offering(),
            "Submitting offering deposit"
        );
        let tx_hash = provider.send_transaction(&request).await?;
        tracing::info!(tx_hash = %tx_hash, "Deposit broadcast, awaiting confirmation");

        let wait = async {
            loop {
                if let Some(receipt) = provider.transaction_receipt(tx_hash).await? {
                    return Ok::<_, WalletError>(receipt);
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        let receipt = tokio::time::timeout(self.confirmation_timeout, wait)
            .await
            .map_err(|_| {
                RpcError::transport(format!(
                    "Deposit {tx_hash} not confirmed after {:?}",
                    self.confirmation_timeout
                ))
            })??;

        if !receipt.success {
            tracing::warn!(tx_hash = %tx_hash, block = receipt.block_number, "Deposit reverted");
            return Err(WalletError::Reverted { tx_hash });
        }

        tracing::info!(tx_hash = %tx_hash, block = receipt.block_number, "Deposit confirmed");
        Ok(receipt)
    }
}
