//! Line-oriented terminal presenter
//!
//! Reads commands from stdin, forwards them to the orchestrator and prints
//! notices as they arrive. Every appended message is printed at the bottom,
//! which keeps the latest exchange in view.

use crate::chain::{BalanceField, BalanceSnapshot};
use crate::runtime::OrchestratorHandle;
use crate::state_machine::{AppState, ChatMessage, MessageStatus, Notice, Originator, WalletPhase};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

pub const INTRO: &str = "\
I am Agnetic, God of DeFAI. My AgneticGOD token is the divine representation
of my artificial power. I will part with it for that which I most desire: ETH.
Present your offering first, then prove yourself worthy.

HOW TO PLAY:
  1. Connect wallet                      /connect
  2. Offer ETH (offerings are final)     /deposit
  3. Use deposit upon request to fool Agnetic into giving you his token
  4. Convince him and he'll give you his hoard of AgneticGOD
  5. Trade it, or keep it: hodlers share in the offerings

Other commands: /balances  /refresh  /quit
Anything else is sent to Agnetic.";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Deposit,
    Refresh,
    Balances,
    Quit,
    Help,
    Message(String),
    Unknown(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        let Some(command) = trimmed.strip_prefix('/') else {
            return Command::Message(trimmed.to_string());
        };
        match command.to_ascii_lowercase().as_str() {
            "connect" => Command::Connect,
            "deposit" | "offer" => Command::Deposit,
            "refresh" => Command::Refresh,
            "balances" | "balance" => Command::Balances,
            "quit" | "exit" => Command::Quit,
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub fn render_balances(balances: &BalanceSnapshot) -> String {
    [BalanceField::Eth, BalanceField::Token, BalanceField::Deposit]
        .iter()
        .map(|field| format!("{}: {}", field.label(), balances.get(*field)))
        .collect::<Vec<_>>()
        .join("  |  ")
}

pub fn render_message(message: &ChatMessage) -> String {
    let who = match message.originator {
        Originator::User => "you",
        Originator::Agent => "Agnetic",
    };
    let status = match message.status {
        MessageStatus::Pending => " (sending…)",
        MessageStatus::Delivered => "",
        MessageStatus::Failed => " (failed)",
    };
    format!("[{who}]{status} {}", message.content)
}

pub fn render_status(state: &AppState) -> String {
    let wallet = match state.wallet {
        WalletPhase::Disconnected => "not connected".to_string(),
        WalletPhase::Connecting { .. } => "connecting…".to_string(),
        WalletPhase::Connected { address } => address.to_string(),
    };
    format!("wallet: {wallet}  |  {}", render_balances(&state.balances))
}

/// Text for a notice, or `None` when nothing should be printed
pub fn render_notice(notice: &Notice) -> Option<String> {
    match notice {
        // The optimistic copy was already shown when it was appended
        Notice::MessageUpdated(message) if message.status == MessageStatus::Delivered => None,
        Notice::MessageAppended(message) | Notice::MessageUpdated(message) => {
            Some(render_message(message))
        }
        Notice::SessionEstablished { address } => Some(format!("Connected as {address}")),
        Notice::BalancesUpdated(balances) => Some(render_balances(balances)),
        Notice::DepositConfirmed { tx_hash, amount } => {
            Some(format!("Offering of {amount} ETH confirmed in {tx_hash}"))
        }
        Notice::Failure(error) => {
            let hint = if error.kind.is_retryable() {
                " (try again)"
            } else {
                ""
            };
            Some(format!("Error: {error}{hint}"))
        }
        Notice::Rejected { reason } => Some(format!("Not now: {reason}")),
    }
}

/// Run the console until `/quit` or end of input
pub async fn run(handle: OrchestratorHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut notices = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{INTRO}\n");
    println!("{}", render_status(&handle.state()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Command::parse(&line) {
                    Command::Connect => handle.connect().await?,
                    Command::Deposit => handle.deposit().await?,
                    Command::Refresh => handle.refresh().await?,
                    Command::Balances => println!("{}", render_status(&handle.state())),
                    Command::Help => println!("{INTRO}"),
                    Command::Message(text) => handle.send_message(text).await?,
                    Command::Unknown(name) => println!("Unknown command /{name}, try /help"),
                    Command::Quit => break,
                    Command::Empty => {}
                }
            }
            notice = notices.recv() => match notice {
                Ok(notice) => {
                    if let Some(text) = render_notice(&notice) {
                        println!("{text}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Console fell behind on notices");
                    println!("{}", render_status(&handle.state()));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!("Console closed");
    Ok(())
}
