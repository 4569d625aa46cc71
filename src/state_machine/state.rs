//! Orchestrator state types

use crate::chain::{Amount, BalanceSnapshot};
use crate::error::ErrorNotice;
use alloy_primitives::Address;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Phases
// ============================================================================

/// Wallet connection phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletPhase {
    #[default]
    Disconnected,
    /// Authorization prompt is open; `previous` is restored if it fails
    Connecting { previous: Option<Address> },
    Connected { address: Address },
}

impl WalletPhase {
    /// The phase a failed connect falls back to
    pub(crate) fn from_previous(previous: Option<Address>) -> Self {
        match previous {
            Some(address) => WalletPhase::Connected { address },
            None => WalletPhase::Disconnected,
        }
    }
}

/// Offering deposit phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPhase {
    #[default]
    Idle,
    Submitting,
}

/// Negotiation busy flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NegotiationPhase {
    #[default]
    Idle,
    /// One exchange is outstanding for the given user message
    Awaiting { message_id: MessageId },
}

// ============================================================================
// Transcript
// ============================================================================

/// Monotonic transcript sequence number, serialized as a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl Serialize for MessageId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Originator {
    User,
    Agent,
}

/// Delivery status of a transcript entry.
///
/// Agent messages are always `Delivered`. User messages start `Pending` and
/// settle exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Delivered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub content: String,
    pub originator: Originator,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            originator: Originator::User,
            status: MessageStatus::Pending,
        }
    }

    pub fn agent(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            originator: Originator::Agent,
            status: MessageStatus::Delivered,
        }
    }
}

// ============================================================================
// Application state
// ============================================================================

/// Everything the presenter renders
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AppState {
    pub wallet: WalletPhase,
    pub deposit: DepositPhase,
    pub negotiation: NegotiationPhase,
    #[serde(skip)]
    pub balances: BalanceSnapshot,
    /// Append-only, in send order
    pub transcript: Vec<ChatMessage>,
    pub next_message_seq: u64,
    /// Most recent failure; cleared when a connect, deposit or exchange
    /// next succeeds
    pub last_error: Option<ErrorNotice>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected_address(&self) -> Option<Address> {
        match self.wallet {
            WalletPhase::Connected { address } => Some(address),
            WalletPhase::Connecting { .. } | WalletPhase::Disconnected => None,
        }
    }

    /// Address whose balances are on screen.
    ///
    /// Stays bound to the previous session while a reconnect is pending, so
    /// completions in that window still refresh what is displayed.
    pub fn balance_address(&self) -> Option<Address> {
        match self.wallet {
            WalletPhase::Connected { address }
            | WalletPhase::Connecting {
                previous: Some(address),
            } => Some(address),
            WalletPhase::Connecting { previous: None } | WalletPhase::Disconnected => None,
        }
    }

    pub fn is_negotiating(&self) -> bool {
        matches!(self.negotiation, NegotiationPhase::Awaiting { .. })
    }

    pub fn is_depositing(&self) -> bool {
        self.deposit == DepositPhase::Submitting
    }

    pub(crate) fn message_mut(&mut self, id: MessageId) -> Option<&mut ChatMessage> {
        self.transcript.iter_mut().find(|m| m.id == id)
    }

    /// Take the next sequence number
    pub(crate) fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_message_seq);
        self.next_message_seq += 1;
        id
    }
}

/// Static inputs to every transition
#[derive(Debug, Clone)]
pub struct AppContext {
    pub chain_id: u64,
    /// Value attached to every deposit
    pub offering: Amount,
}

impl AppContext {
    pub fn new(chain_id: u64, offering: Amount) -> Self {
        Self { chain_id, offering }
    }
}
