//! Events that drive the orchestrator

use crate::chain::BalanceReadings;
use crate::error::ErrorNotice;
use crate::state_machine::state::MessageId;
use crate::wallet::Session;
use alloy_primitives::{Address, B256};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User actions
    Connect,
    Deposit,
    SendMessage {
        text: String,
    },
    Refresh,

    // Wallet completions
    Connected {
        session: Session,
    },
    ConnectFailed {
        error: ErrorNotice,
    },
    DepositConfirmed {
        tx_hash: B256,
        block_number: u64,
    },
    DepositFailed {
        error: ErrorNotice,
    },

    // Negotiation completions
    AgentReplied {
        message_id: MessageId,
        reply: String,
    },
    NegotiationFailed {
        message_id: MessageId,
        error: ErrorNotice,
    },

    // Chain completions
    BalancesRead {
        address: Address,
        readings: BalanceReadings,
    },
}

impl Event {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Connect => "connect",
            Event::Deposit => "deposit",
            Event::SendMessage { .. } => "send_message",
            Event::Refresh => "refresh",
            Event::Connected { .. } => "connected",
            Event::ConnectFailed { .. } => "connect_failed",
            Event::DepositConfirmed { .. } => "deposit_confirmed",
            Event::DepositFailed { .. } => "deposit_failed",
            Event::AgentReplied { .. } => "agent_replied",
            Event::NegotiationFailed { .. } => "negotiation_failed",
            Event::BalancesRead { .. } => "balances_read",
        }
    }

    /// Whether the event originates from the user rather than from I/O
    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            Event::Connect | Event::Deposit | Event::SendMessage { .. } | Event::Refresh
        )
    }
}
