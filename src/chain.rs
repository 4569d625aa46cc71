//! Read-only access to chain state
//!
//! Three balances matter to the offering flow: native ETH, the Agnetic
//! token, and the deposit contract's ledger entry for the session address.

mod amount;
mod balances;
pub mod contracts;
mod reader;
pub mod rpc;

pub use amount::{Amount, DISPLAY_PLACES, ETHER_DECIMALS};
pub use balances::{BalanceField, BalanceReadings, BalanceSnapshot, BalanceValue};
pub use contracts::Contracts;
pub use reader::RpcChainReader;
pub use rpc::{HttpTransport, RpcError, RpcTransport};
