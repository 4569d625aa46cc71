//! Orchestrator runtime executor

use super::traits::BalanceReader;
use super::OrchestratorHandle;

use crate::error::{ErrorKind, ErrorNotice};
use crate::negotiation::Negotiator;
use crate::state_machine::{transition, AppContext, AppState, Effect, Event, Notice};
use crate::wallet::{DepositSubmitter, Session, SessionManager};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const NOTICE_CHANNEL_CAPACITY: usize = 128;

/// Owns the application state and runs effects against the collaborators
pub struct OrchestratorRuntime<B, N>
where
    B: BalanceReader + 'static,
    N: Negotiator + 'static,
{
    context: AppContext,
    state: AppState,
    sessions: Arc<SessionManager>,
    submitter: Arc<DepositSubmitter>,
    /// Installed only when a connect completes
    session: Option<Session>,
    chain: Arc<B>,
    negotiator: Arc<N>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    state_tx: watch::Sender<AppState>,
    notice_tx: broadcast::Sender<Notice>,
}

impl<B, N> OrchestratorRuntime<B, N>
where
    B: BalanceReader + 'static,
    N: Negotiator + 'static,
{
    pub fn new(
        context: AppContext,
        sessions: SessionManager,
        submitter: DepositSubmitter,
        chain: B,
        negotiator: N,
    ) -> (Self, OrchestratorHandle) {
        let state = AppState::new();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        let handle = OrchestratorHandle {
            event_tx: event_tx.clone(),
            state_rx,
            notice_tx: notice_tx.clone(),
        };

        let runtime = Self {
            context,
            state,
            sessions: Arc::new(sessions),
            submitter: Arc::new(submitter),
            session: None,
            chain: Arc::new(chain),
            negotiator: Arc::new(negotiator),
            event_rx,
            event_tx,
            state_tx,
            notice_tx,
        };

        (runtime, handle)
    }

    pub async fn run(mut self) {
        tracing::info!(
            chain_id = self.context.chain_id,
            offering = %self.context.offering,
            wallet_available = self.sessions.is_available(),
            "Starting orchestrator runtime"
        );

        // The runtime keeps a sender for spawned tasks, so this only ends
        // when the task is dropped.
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!("Orchestrator runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let name = current_event.name();
            let from_user = current_event.is_user_action();
            // Sessions never pass through the pure state; keep a copy to
            // install once the transition accepts the connect.
            let established = match &current_event {
                Event::Connected { session } => Some(session.clone()),
                _ => None,
            };

            let result = match transition(&self.state, &self.context, current_event) {
                Ok(r) => r,
                Err(e) => {
                    if from_user {
                        tracing::info!(event = name, reason = %e, "Action rejected");
                        let _ = self.notice_tx.send(Notice::Rejected {
                            reason: e.to_string(),
                        });
                    } else {
                        tracing::warn!(event = name, error = %e, "Dropping unexpected completion");
                    }
                    continue;
                }
            };

            tracing::debug!(
                event = name,
                effects = result.effects.len(),
                io = result.effects.iter().filter(|e| e.is_io()).count(),
                "Transition applied"
            );
            self.state = result.new_state;
            if let Some(session) = established {
                self.session = Some(session);
            }

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect) {
                    events_to_process.push(generated_event);
                }
            }
        }
    }

    /// Run one effect. I/O is spawned and reports back through the event
    /// channel; an effect that cannot start yields its failure event directly.
    fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::PublishState => {
                self.state_tx.send_replace(self.state.clone());
                None
            }

            Effect::NotifyClient(notice) => {
                // No subscribers is fine
                let _ = self.notice_tx.send(notice);
                None
            }

            Effect::RequestAuthorization => {
                let sessions = self.sessions.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::info!("Requesting wallet authorization");
                    let event = match sessions.connect().await {
                        Ok(session) => Event::Connected { session },
                        Err(e) => {
                            tracing::warn!(error = %e, kind = %e.kind(), "Wallet connect failed");
                            Event::ConnectFailed {
                                error: ErrorNotice::new(e.kind(), e.to_string()),
                            }
                        }
                    };
                    if event_tx.send(event).await.is_err() {
                        tracing::debug!("Runtime gone before connect completed");
                    }
                });
                None
            }

            Effect::SubmitDeposit { address } => {
                let Some(session) = self.session.clone().filter(|s| s.address() == address)
                else {
                    tracing::error!(address = %address, "No signing session for deposit");
                    return Some(Event::DepositFailed {
                        error: ErrorNotice::new(
                            ErrorKind::WalletUnavailable,
                            "no signing session for the connected address",
                        ),
                    });
                };
                let submitter = self.submitter.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    let event = match submitter.submit(&session).await {
                        Ok(receipt) => Event::DepositConfirmed {
                            tx_hash: receipt.transaction_hash,
                            block_number: receipt.block_number,
                        },
                        Err(e) => {
                            tracing::warn!(address = %address, error = %e, kind = %e.kind(), "Deposit failed");
                            Event::DepositFailed {
                                error: ErrorNotice::new(e.kind(), e.to_string()),
                            }
                        }
                    };
                    if event_tx.send(event).await.is_err() {
                        tracing::debug!("Runtime gone before deposit completed");
                    }
                });
                None
            }

            Effect::Negotiate {
                message_id,
                address,
                text,
            } => {
                let negotiator = self.negotiator.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    let event = match negotiator.send(address, &text).await {
                        Ok(reply) => Event::AgentReplied { message_id, reply },
                        Err(e) => Event::NegotiationFailed {
                            message_id,
                            error: ErrorNotice::new(e.kind(), e.to_string()),
                        },
                    };
                    if event_tx.send(event).await.is_err() {
                        tracing::debug!(message_id = %message_id, "Runtime gone before reply arrived");
                    }
                });
                None
            }

            Effect::RefreshBalances { address } => {
                let chain = self.chain.clone();
                let event_tx = self.event_tx.clone();

                tokio::spawn(async move {
                    tracing::debug!(address = %address, "Refreshing balances");
                    let readings = chain.read_balances(address).await;
                    if event_tx
                        .send(Event::BalancesRead { address, readings })
                        .await
                        .is_err()
                    {
                        tracing::debug!("Runtime gone before balances arrived");
                    }
                });
                None
            }
        }
    }
}
