//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::chain::{BalanceReadings, RpcChainReader, RpcTransport};
use alloy_primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the three offering balances
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Read ETH, token and deposit ledger balances; never short-circuits
    async fn read_balances(&self, address: Address) -> BalanceReadings;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: BalanceReader + ?Sized> BalanceReader for Arc<T> {
    async fn read_balances(&self, address: Address) -> BalanceReadings {
        (**self).read_balances(address).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl<T: RpcTransport + 'static> BalanceReader for RpcChainReader<T> {
    async fn read_balances(&self, address: Address) -> BalanceReadings {
        RpcChainReader::read_balances(self, address).await
    }
}
