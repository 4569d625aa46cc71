//! Runtime for the offering orchestrator
//!
//! The executor is the single writer of `AppState`. Observers read snapshots
//! through a watch channel and discrete notices through a broadcast channel;
//! user actions enter through `OrchestratorHandle`.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::OrchestratorRuntime;
pub use traits::*;

use crate::chain::{HttpTransport, RpcChainReader};
use crate::negotiation::{LoggingNegotiator, NegotiationService};
use crate::state_machine::{AppState, Event, Notice};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime =
    OrchestratorRuntime<RpcChainReader<HttpTransport>, LoggingNegotiator<NegotiationService>>;

/// The runtime task has stopped and can no longer take actions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Orchestrator runtime is not running")]
pub struct RuntimeStopped;

/// Handle to interact with a running orchestrator
#[derive(Clone)]
pub struct OrchestratorHandle {
    event_tx: mpsc::Sender<Event>,
    state_rx: watch::Receiver<AppState>,
    notice_tx: broadcast::Sender<Notice>,
}

impl OrchestratorHandle {
    /// Open the wallet authorization prompt
    pub async fn connect(&self) -> Result<(), RuntimeStopped> {
        self.dispatch(Event::Connect).await
    }

    /// Offer the fixed deposit
    pub async fn deposit(&self) -> Result<(), RuntimeStopped> {
        self.dispatch(Event::Deposit).await
    }

    pub async fn send_message(&self, text: impl Into<String>) -> Result<(), RuntimeStopped> {
        self.dispatch(Event::SendMessage { text: text.into() }).await
    }

    /// Re-read balances for the connected address
    pub async fn refresh(&self) -> Result<(), RuntimeStopped> {
        self.dispatch(Event::Refresh).await
    }

    /// Latest published state
    pub fn state(&self) -> AppState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    async fn dispatch(&self, event: Event) -> Result<(), RuntimeStopped> {
        self.event_tx.send(event).await.map_err(|_| RuntimeStopped)
    }
}
