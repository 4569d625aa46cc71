//! Effects produced by state transitions

use crate::chain::{Amount, BalanceSnapshot};
use crate::error::ErrorNotice;
use crate::state_machine::state::{ChatMessage, MessageId};
use alloy_primitives::{Address, B256};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open the wallet authorization prompt
    RequestAuthorization,

    /// Sign and submit the offering, then wait for one confirmation
    SubmitDeposit { address: Address },

    /// Send one user message to the negotiation backend
    Negotiate {
        message_id: MessageId,
        address: Address,
        text: String,
    },

    /// Read all three balances for the address
    RefreshBalances { address: Address },

    /// Publish the new state snapshot to observers
    PublishState,

    /// Notify connected observers
    NotifyClient(Notice),
}

impl Effect {
    pub fn notify(notice: Notice) -> Self {
        Effect::NotifyClient(notice)
    }

    pub fn failure(error: ErrorNotice) -> Self {
        Effect::NotifyClient(Notice::Failure(error))
    }

    /// Whether executing this effect performs I/O
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Effect::RequestAuthorization
                | Effect::SubmitDeposit { .. }
                | Effect::Negotiate { .. }
                | Effect::RefreshBalances { .. }
        )
    }
}

/// Discrete updates pushed to observers alongside state snapshots
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    MessageAppended(ChatMessage),
    /// A user message settled to `Delivered` or `Failed`
    MessageUpdated(ChatMessage),
    SessionEstablished {
        address: Address,
    },
    BalancesUpdated(BalanceSnapshot),
    DepositConfirmed {
        tx_hash: B256,
        amount: Amount,
    },
    Failure(ErrorNotice),
    /// An action was refused without changing state
    Rejected {
        reason: String,
    },
}
