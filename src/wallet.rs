//! Wallet session and the offering deposit
//!
//! The wallet provider is the only signing authority. A `Session` binds the
//! first authorized account to a signing context on the target chain; the
//! deposit submitter signs through that context and waits for confirmation.

mod deposit;
mod error;
mod provider;
mod session;

pub use deposit::DepositSubmitter;
pub use error::WalletError;
pub use provider::{Eip1193Bridge, TransactionReceipt, TransactionRequest, WalletProvider};
pub use session::{Session, SessionManager, SigningContext};
