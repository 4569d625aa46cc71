//! Pure state transition function

use super::state::{ChatMessage, MessageId, MessageStatus};
use super::{AppContext, AppState, DepositPhase, Effect, Event, NegotiationPhase, Notice, WalletPhase};
use crate::chain::BalanceSnapshot;
use crate::error::{ErrorKind, ErrorNotice};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: AppState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: AppState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Reasons an event is refused.
///
/// A refused event leaves the state untouched and issues no I/O.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Connect a wallet first")]
    NotConnected,
    #[error("Wallet authorization already in progress")]
    ConnectInFlight,
    #[error("A deposit is already being submitted")]
    DepositInFlight,
    #[error("Waiting for the agent to answer the previous message")]
    NegotiationBusy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &AppState,
    context: &AppContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Wallet connection
        // ============================================================
        Event::Connect => {
            if let WalletPhase::Connecting { .. } = state.wallet {
                return Err(TransitionError::ConnectInFlight);
            }
            let mut next = state.clone();
            next.wallet = WalletPhase::Connecting {
                previous: state.connected_address(),
            };
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestAuthorization))
        }

        Event::Connected { session } => {
            let WalletPhase::Connecting { previous } = state.wallet else {
                return Err(TransitionError::InvalidTransition(
                    "session established without a pending connect".to_string(),
                ));
            };
            let address = session.address();
            let mut next = state.clone();
            next.wallet = WalletPhase::Connected { address };
            next.last_error = None;
            if previous != Some(address) {
                next.balances = BalanceSnapshot::pending();
            }
            Ok(TransitionResult::new(next).with_effects([
                Effect::PublishState,
                Effect::notify(Notice::SessionEstablished { address }),
                Effect::RefreshBalances { address },
            ]))
        }

        Event::ConnectFailed { error } => {
            let WalletPhase::Connecting { previous } = state.wallet else {
                return Err(TransitionError::InvalidTransition(
                    "connect failure without a pending connect".to_string(),
                ));
            };
            let mut next = state.clone();
            next.wallet = WalletPhase::from_previous(previous);
            next.last_error = Some(error.clone());
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::failure(error)))
        }

        // ============================================================
        // Offering deposit
        // ============================================================
        Event::Deposit => {
            let address = state
                .connected_address()
                .ok_or(TransitionError::NotConnected)?;
            if state.is_depositing() {
                return Err(TransitionError::DepositInFlight);
            }
            let mut next = state.clone();
            next.deposit = DepositPhase::Submitting;
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::SubmitDeposit { address }))
        }

        Event::DepositConfirmed {
            tx_hash,
            block_number: _,
        } => {
            if !state.is_depositing() {
                return Err(TransitionError::InvalidTransition(
                    "deposit confirmation without a pending deposit".to_string(),
                ));
            }
            let mut next = state.clone();
            next.deposit = DepositPhase::Idle;
            next.last_error = None;
            let result = TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::notify(Notice::DepositConfirmed {
                    tx_hash,
                    amount: context.offering,
                }));
            Ok(with_refresh(result))
        }

        Event::DepositFailed { error } => {
            if !state.is_depositing() {
                return Err(TransitionError::InvalidTransition(
                    "deposit failure without a pending deposit".to_string(),
                ));
            }
            let mut next = state.clone();
            next.deposit = DepositPhase::Idle;
            next.last_error = Some(error.clone());
            let result = TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::failure(error));
            Ok(with_refresh(result))
        }

        // ============================================================
        // Negotiation
        // ============================================================
        Event::SendMessage { text } => {
            let address = state
                .connected_address()
                .ok_or(TransitionError::NotConnected)?;
            if state.is_negotiating() {
                return Err(TransitionError::NegotiationBusy);
            }
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            let mut next = state.clone();
            let message_id = next.allocate_id();
            let message = ChatMessage::user(message_id, text.clone());
            next.transcript.push(message.clone());
            next.negotiation = NegotiationPhase::Awaiting { message_id };

            Ok(TransitionResult::new(next).with_effects([
                Effect::PublishState,
                Effect::notify(Notice::MessageAppended(message)),
                Effect::Negotiate {
                    message_id,
                    address,
                    text,
                },
            ]))
        }

        Event::AgentReplied { message_id, reply } => {
            expect_awaiting(state, message_id)?;
            let mut next = state.clone();
            let updated = settle(&mut next, message_id, MessageStatus::Delivered)?;
            let agent_id = next.allocate_id();
            let agent_message = ChatMessage::agent(agent_id, reply);
            next.transcript.push(agent_message.clone());
            next.negotiation = NegotiationPhase::Idle;
            next.last_error = None;

            let result = TransitionResult::new(next).with_effects([
                Effect::PublishState,
                Effect::notify(Notice::MessageUpdated(updated)),
                Effect::notify(Notice::MessageAppended(agent_message)),
            ]);
            Ok(with_refresh(result))
        }

        Event::NegotiationFailed { message_id, error } => {
            expect_awaiting(state, message_id)?;
            let mut next = state.clone();
            let updated = settle(&mut next, message_id, MessageStatus::Failed)?;
            next.negotiation = NegotiationPhase::Idle;
            next.last_error = Some(error.clone());

            Ok(TransitionResult::new(next).with_effects([
                Effect::PublishState,
                Effect::notify(Notice::MessageUpdated(updated)),
                Effect::failure(error),
            ]))
        }

        // ============================================================
        // Balances
        // ============================================================
        Event::Refresh => {
            let address = state
                .balance_address()
                .ok_or(TransitionError::NotConnected)?;
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::RefreshBalances { address }))
        }

        Event::BalancesRead { address, readings } => {
            // Reads for a session that has since changed are dropped
            if state.balance_address() != Some(address) {
                return Ok(TransitionResult::new(state.clone()));
            }

            let mut next = state.clone();
            let notices: Vec<ErrorNotice> = next
                .balances
                .apply(readings)
                .into_iter()
                .map(|(field, error)| {
                    ErrorNotice::new(
                        ErrorKind::Rpc,
                        format!("{} balance unavailable: {error}", field.label()),
                    )
                })
                .collect();
            if let Some(first) = notices.first() {
                next.last_error = Some(first.clone());
            }
            let snapshot = next.balances;

            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::notify(Notice::BalancesUpdated(snapshot)))
                .with_effects(notices.into_iter().map(Effect::failure)))
        }
    }
}

/// Append a balance refresh for the displayed address, if any
fn with_refresh(result: TransitionResult) -> TransitionResult {
    match result.new_state.balance_address() {
        Some(address) => result.with_effect(Effect::RefreshBalances { address }),
        None => result,
    }
}

fn expect_awaiting(state: &AppState, message_id: MessageId) -> Result<(), TransitionError> {
    match state.negotiation {
        NegotiationPhase::Awaiting { message_id: pending } if pending == message_id => Ok(()),
        NegotiationPhase::Awaiting { message_id: pending } => Err(
            TransitionError::InvalidTransition(format!(
                "completion for message {message_id} while awaiting {pending}"
            )),
        ),
        NegotiationPhase::Idle => Err(TransitionError::InvalidTransition(format!(
            "completion for message {message_id} with no exchange outstanding"
        ))),
    }
}

/// Settle a pending user message, returning its updated copy
fn settle(
    state: &mut AppState,
    message_id: MessageId,
    status: MessageStatus,
) -> Result<ChatMessage, TransitionError> {
    let message = state.message_mut(message_id).ok_or_else(|| {
        TransitionError::InvalidTransition(format!("message {message_id} not in transcript"))
    })?;
    message.status = status;
    Ok(message.clone())
}
