//! Orchestrator state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime owns the only copy of `AppState` and feeds every user action
//! and every I/O completion through `transition`.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, Notice};
pub use event::Event;
pub use state::{
    AppContext, AppState, ChatMessage, DepositPhase, MessageId, MessageStatus, NegotiationPhase,
    Originator, WalletPhase,
};
pub use transition::{transition, TransitionError, TransitionResult};
