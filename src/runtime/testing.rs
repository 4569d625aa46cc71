//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::{OrchestratorHandle, OrchestratorRuntime};
use crate::chain::contracts::{DEPOSIT_ADDRESS, TARGET_CHAIN_ID};
use crate::chain::{Amount, BalanceReadings, RpcError, RpcTransport};
use crate::negotiation::{NegotiationError, NegotiationResponse, Negotiator};
use crate::state_machine::{AppContext, AppState, Notice};
use crate::wallet::{
    DepositSubmitter, Session, SessionManager, TransactionReceipt, TransactionRequest,
    WalletError, WalletProvider,
};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);

// ============================================================================
// Scripted JSON-RPC transport
// ============================================================================

type Handler = dyn Fn(&str, &Value) -> Result<Value, RpcError> + Send + Sync;

/// Transport that answers every request through a closure
pub struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every `(method, params)` seen so far, in order
    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));
        (self.handler)(method, &params)
    }
}

// ============================================================================
// In-memory chain
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct Ledger {
    eth: U256,
    token: U256,
    deposit: U256,
}

/// Balances held in memory; deposits made through a `MockWallet` attached to
/// it are credited to the ledger
#[derive(Default)]
pub struct InMemoryChain {
    accounts: Mutex<HashMap<Address, Ledger>>,
    fail_eth: AtomicBool,
    fail_deposit: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ETH and token balances, both in wei
    pub fn fund(&self, address: Address, eth: u128, token: u128) {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts.entry(address).or_default();
        entry.eth = U256::from(eth);
        entry.token = U256::from(token);
    }

    pub fn credit_deposit(&self, address: Address, value: U256) {
        let mut accounts = self.accounts.lock().unwrap();
        let entry = accounts.entry(address).or_default();
        entry.deposit += value;
        entry.eth = entry.eth.saturating_sub(value);
    }

    pub fn deposit_of(&self, address: Address) -> U256 {
        self.accounts
            .lock()
            .unwrap()
            .get(&address)
            .map_or(U256::ZERO, |l| l.deposit)
    }

    pub fn fail_eth_reads(&self, fail: bool) {
        self.fail_eth.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deposit_reads(&self, fail: bool) {
        self.fail_deposit.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceReader for InMemoryChain {
    async fn read_balances(&self, address: Address) -> BalanceReadings {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let ledger = self
            .accounts
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default();

        BalanceReadings {
            eth: if self.fail_eth.load(Ordering::SeqCst) {
                Err(RpcError::transport("Connection failed"))
            } else {
                Ok(Amount::ether(ledger.eth))
            },
            token: Ok(Amount::ether(ledger.token)),
            deposit: if self.fail_deposit.load(Ordering::SeqCst) {
                Amount::zero()
            } else {
                Amount::ether(ledger.deposit)
            },
        }
    }
}

// ============================================================================
// Mock wallet
// ============================================================================

/// Scripted injected wallet
#[derive(Default)]
pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    reject_authorization: AtomicBool,
    reject_transactions: AtomicBool,
    revert_transactions: AtomicBool,
    pending_polls: AtomicU32,
    authorization_requests: AtomicUsize,
    receipt_polls: AtomicUsize,
    sent: Mutex<Vec<TransactionRequest>>,
    ledger: Option<Arc<InMemoryChain>>,
}

impl MockWallet {
    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Self::default()
        }
    }

    /// A wallet whose user declines every authorization prompt
    pub fn rejecting() -> Self {
        let wallet = Self::with_accounts(vec![ALICE]);
        wallet.reject_authorization.store(true, Ordering::SeqCst);
        wallet
    }

    pub fn with_ledger(mut self, ledger: Arc<InMemoryChain>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn reject_transactions(&self) {
        self.reject_transactions.store(true, Ordering::SeqCst);
    }

    pub fn revert_transactions(&self) {
        self.revert_transactions.store(true, Ordering::SeqCst);
    }

    /// Number of receipt polls answered `None` before the receipt appears
    pub fn set_pending_polls(&self, polls: u32) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }

    pub fn receipt_polls(&self) -> usize {
        self.receipt_polls.load(Ordering::SeqCst)
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_authorization.load(Ordering::SeqCst) {
            return Err(RpcError::node(4001, "User rejected the request.").into());
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<B256, WalletError> {
        if self.reject_transactions.load(Ordering::SeqCst) {
            return Err(RpcError::node(4001, "User denied transaction signature.").into());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(request.clone());
        if !self.revert_transactions.load(Ordering::SeqCst) {
            if let Some(ledger) = &self.ledger {
                ledger.credit_deposit(request.from, request.value);
            }
        }
        let nonce = u8::try_from(sent.len()).unwrap_or(u8::MAX);
        Ok(B256::with_last_byte(nonce))
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        self.receipt_polls.fetch_add(1, Ordering::SeqCst);
        let still_pending = self
            .pending_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if still_pending {
            return Ok(None);
        }
        Ok(Some(TransactionReceipt {
            transaction_hash: hash,
            block_number: 1,
            success: !self.revert_transactions.load(Ordering::SeqCst),
        }))
    }
}

/// Session bound to a throwaway mock wallet
pub fn test_session(address: Address) -> Session {
    Session::new(
        Arc::new(MockWallet::with_accounts(vec![address])),
        address,
        TARGET_CHAIN_ID,
    )
}

// ============================================================================
// Mock negotiator
// ============================================================================

/// Negotiator that returns queued replies, optionally held until released
#[derive(Default)]
pub struct MockNegotiator {
    responses: Mutex<VecDeque<Result<String, NegotiationError>>>,
    requests: Mutex<Vec<(Address, String)>>,
    gate: Option<Arc<Notify>>,
}

impl MockNegotiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every reply until `release` is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue a raw backend answer; the reply is its last fragment
    pub fn queue_fragments(&self, fragments: &[&str]) {
        let response = NegotiationResponse {
            responses: fragments.iter().map(ToString::to_string).collect(),
        };
        self.responses
            .lock()
            .unwrap()
            .push_back(response.into_reply());
    }

    pub fn queue_error(&self, error: NegotiationError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<(Address, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Negotiator for MockNegotiator {
    async fn send(&self, address: Address, text: &str) -> Result<String, NegotiationError> {
        self.requests
            .lock()
            .unwrap()
            .push((address, text.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(NegotiationError::Network("No mock response queued".into())))
    }

    fn endpoint(&self) -> &str {
        "mock://agent"
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// A running orchestrator wired to in-memory collaborators
pub struct TestRuntime {
    pub handle: OrchestratorHandle,
    pub notices: broadcast::Receiver<Notice>,
    pub wallet: Option<Arc<MockWallet>>,
    pub chain: Arc<InMemoryChain>,
    pub negotiator: Arc<MockNegotiator>,
    _runtime_handle: tokio::task::JoinHandle<()>,
}

enum WalletSetup {
    Default,
    Absent,
    Custom(MockWallet),
}

pub struct TestRuntimeBuilder {
    wallet: WalletSetup,
    chain: InMemoryChain,
    negotiator: MockNegotiator,
}

impl TestRuntime {
    pub fn builder() -> TestRuntimeBuilder {
        TestRuntimeBuilder {
            wallet: WalletSetup::Default,
            chain: InMemoryChain::new(),
            negotiator: MockNegotiator::new(),
        }
    }

    /// Wait until the published state satisfies `pred`
    pub async fn wait_for(&self, mut pred: impl FnMut(&AppState) -> bool) -> AppState {
        let mut rx = self.handle.state_rx.clone();
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            rx.wait_for(|state| pred(state)).await.map(|state| (*state).clone())
        })
        .await;
        waited
            .expect("timed out waiting for state")
            .expect("runtime stopped")
    }

    /// Skip notices until one matches `pred`
    pub async fn next_notice(&mut self, mut pred: impl FnMut(&Notice) -> bool) -> Notice {
        let notices = &mut self.notices;
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notice = notices.recv().await.expect("notice channel closed");
                if pred(&notice) {
                    return notice;
                }
            }
        })
        .await
        .expect("timed out waiting for notice")
    }

    /// Connect and wait for the first balance read to land
    pub async fn connected(&mut self) -> AppState {
        self.handle.connect().await.unwrap();
        self.next_notice(|n| matches!(n, Notice::BalancesUpdated(_)))
            .await;
        self.handle.state()
    }
}

impl TestRuntimeBuilder {
    pub fn wallet(mut self, wallet: MockWallet) -> Self {
        self.wallet = WalletSetup::Custom(wallet);
        self
    }

    pub fn no_wallet(mut self) -> Self {
        self.wallet = WalletSetup::Absent;
        self
    }

    pub fn chain(mut self, chain: InMemoryChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn negotiator(mut self, negotiator: MockNegotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    pub fn build(self) -> TestRuntime {
        let chain = Arc::new(self.chain);
        let negotiator = Arc::new(self.negotiator);
        let wallet = match self.wallet {
            WalletSetup::Default => Some(MockWallet::with_accounts(vec![ALICE])),
            WalletSetup::Absent => None,
            WalletSetup::Custom(wallet) => Some(wallet),
        }
        .map(|w| Arc::new(w.with_ledger(chain.clone())));

        let provider = wallet
            .clone()
            .map(|w| w as Arc<dyn WalletProvider>);
        let sessions = SessionManager::new(provider, TARGET_CHAIN_ID);
        let submitter = DepositSubmitter::new(
            DEPOSIT_ADDRESS,
            Duration::from_millis(5),
            Duration::from_secs(5),
        );
        let context = AppContext::new(TARGET_CHAIN_ID, submitter.offering());

        let (runtime, handle) =
            OrchestratorRuntime::new(context, sessions, submitter, chain.clone(), negotiator.clone());
        let notices = handle.subscribe();
        let runtime_handle = tokio::spawn(async move {
            runtime.run().await;
        });

        TestRuntime {
            handle,
            notices,
            wallet,
            chain,
            negotiator,
            _runtime_handle: runtime_handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::contracts::OFFERING_WEI;
    use crate::chain::{BalanceSnapshot, BalanceValue};
    use crate::error::ErrorKind;
    use crate::state_machine::{
        DepositPhase, MessageStatus, NegotiationPhase, Originator, WalletPhase,
    };

    const ONE_ETH: u128 = 1_000_000_000_000_000_000;

    #[tokio::test]
    async fn test_connect_without_wallet_reports_unavailable() {
        let mut rt = TestRuntime::builder().no_wallet().build();
        rt.handle.connect().await.unwrap();

        let notice = rt.next_notice(|n| matches!(n, Notice::Failure(_))).await;
        let Notice::Failure(error) = notice else {
            unreachable!()
        };
        assert_eq!(error.kind, ErrorKind::WalletUnavailable);

        let state = rt
            .wait_for(|s| s.wallet == WalletPhase::Disconnected && s.last_error.is_some())
            .await;
        assert_eq!(state.connected_address(), None);
        assert_eq!(rt.chain.read_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_authorization_stays_disconnected() {
        let mut rt = TestRuntime::builder()
            .wallet(MockWallet::rejecting())
            .build();
        rt.handle.connect().await.unwrap();

        let notice = rt.next_notice(|n| matches!(n, Notice::Failure(_))).await;
        assert!(matches!(notice, Notice::Failure(e) if e.kind == ErrorKind::UserRejected));
        assert_eq!(rt.handle.state().wallet, WalletPhase::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_reads_balances_once() {
        let chain = InMemoryChain::new();
        chain.fund(ALICE, 2 * ONE_ETH, 5 * ONE_ETH);
        let mut rt = TestRuntime::builder().chain(chain).build();

        let state = rt.connected().await;
        assert_eq!(state.connected_address(), Some(ALICE));
        assert_eq!(state.balances.eth.to_string(), "2.0000");
        assert_eq!(state.balances.token.to_string(), "5.0000");
        assert_eq!(state.balances.deposit.to_string(), "0.0000");
        assert_eq!(rt.chain.read_count(), 1);
    }

    #[tokio::test]
    async fn test_deposit_scenario_credits_offering() {
        let chain = InMemoryChain::new();
        chain.fund(ALICE, ONE_ETH, 0);
        let mut rt = TestRuntime::builder().chain(chain).build();
        rt.connected().await;

        rt.handle.deposit().await.unwrap();
        rt.next_notice(|n| matches!(n, Notice::DepositConfirmed { .. }))
            .await;
        let state = rt
            .wait_for(|s| {
                s.deposit == DepositPhase::Idle && s.balances.deposit.to_string() == "0.0019"
            })
            .await;

        assert_eq!(state.balances.eth.to_string(), "0.9981");
        assert_eq!(rt.chain.deposit_of(ALICE), U256::from(OFFERING_WEI));
        let sent = rt.wallet.as_ref().unwrap().sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, DEPOSIT_ADDRESS);
    }

    #[tokio::test]
    async fn test_second_deposit_while_in_flight_is_rejected() {
        let wallet = MockWallet::with_accounts(vec![ALICE]);
        wallet.set_pending_polls(20);
        let mut rt = TestRuntime::builder().wallet(wallet).build();
        rt.connected().await;

        rt.handle.deposit().await.unwrap();
        rt.handle.deposit().await.unwrap();
        let notice = rt.next_notice(|n| matches!(n, Notice::Rejected { .. })).await;
        assert!(matches!(notice, Notice::Rejected { reason } if reason.contains("deposit")));

        rt.next_notice(|n| matches!(n, Notice::DepositConfirmed { .. }))
            .await;
        assert_eq!(rt.wallet.as_ref().unwrap().sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_deposit_rejection_releases_guard_and_refreshes() {
        let wallet = MockWallet::with_accounts(vec![ALICE]);
        wallet.reject_transactions();
        let mut rt = TestRuntime::builder().wallet(wallet).build();
        rt.connected().await;
        let reads_before = rt.chain.read_count();

        rt.handle.deposit().await.unwrap();
        let notice = rt.next_notice(|n| matches!(n, Notice::Failure(_))).await;
        assert!(matches!(notice, Notice::Failure(e) if e.kind == ErrorKind::UserRejected));
        rt.next_notice(|n| matches!(n, Notice::BalancesUpdated(_)))
            .await;

        assert_eq!(rt.handle.state().deposit, DepositPhase::Idle);
        assert_eq!(rt.chain.read_count(), reads_before + 1);
        assert_eq!(rt.chain.deposit_of(ALICE), U256::ZERO);
    }

    #[tokio::test]
    async fn test_negotiation_round_trip() {
        let negotiator = MockNegotiator::new();
        negotiator.queue_fragments(&["considering", "I accept 5 tokens"]);
        let mut rt = TestRuntime::builder().negotiator(negotiator).build();
        rt.connected().await;
        let reads_before = rt.chain.read_count();

        rt.handle.send_message("I offer 0.001875 ETH").await.unwrap();
        let state = rt
            .wait_for(|s| s.transcript.len() == 2 && s.negotiation == NegotiationPhase::Idle)
            .await;

        assert_eq!(state.transcript[0].originator, Originator::User);
        assert_eq!(state.transcript[0].status, MessageStatus::Delivered);
        assert_eq!(state.transcript[1].content, "I accept 5 tokens");
        assert_eq!(
            rt.negotiator.recorded_requests(),
            vec![(ALICE, "I offer 0.001875 ETH".to_string())]
        );

        rt.next_notice(|n| matches!(n, Notice::BalancesUpdated(_)))
            .await;
        assert!(rt.chain.read_count() > reads_before);
    }

    #[tokio::test]
    async fn test_second_send_while_pending_is_noop() {
        let negotiator = MockNegotiator::new().gated();
        negotiator.queue_reply("ok");
        let mut rt = TestRuntime::builder().negotiator(negotiator).build();
        rt.connected().await;

        rt.handle.send_message("first").await.unwrap();
        rt.wait_for(|s| s.negotiation != NegotiationPhase::Idle).await;
        rt.handle.send_message("second").await.unwrap();
        rt.next_notice(|n| matches!(n, Notice::Rejected { .. })).await;

        let state = rt.handle.state();
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript[0].status, MessageStatus::Pending);

        rt.negotiator.release();
        let state = rt.wait_for(|s| s.transcript.len() == 2).await;
        assert_eq!(state.transcript[0].content, "first");
        assert_eq!(rt.negotiator.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_marks_message_and_releases_busy_flag() {
        let negotiator = MockNegotiator::new();
        negotiator.queue_error(NegotiationError::Network("connection refused".into()));
        negotiator.queue_reply("second try worked");
        let mut rt = TestRuntime::builder().negotiator(negotiator).build();
        rt.connected().await;

        rt.handle.send_message("hello").await.unwrap();
        let notice = rt.next_notice(|n| matches!(n, Notice::Failure(_))).await;
        assert!(matches!(notice, Notice::Failure(e) if e.kind == ErrorKind::Network));

        let state = rt
            .wait_for(|s| s.negotiation == NegotiationPhase::Idle && !s.transcript.is_empty())
            .await;
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript[0].status, MessageStatus::Failed);

        rt.handle.send_message("hello again").await.unwrap();
        let state = rt.wait_for(|s| s.transcript.len() == 3).await;
        assert_eq!(state.transcript[1].status, MessageStatus::Delivered);
        assert_eq!(state.transcript[2].content, "second try worked");
    }

    #[tokio::test]
    async fn test_actions_before_connect_are_rejected() {
        let mut rt = TestRuntime::builder().build();

        rt.handle.send_message("hi").await.unwrap();
        rt.next_notice(|n| matches!(n, Notice::Rejected { .. })).await;
        rt.handle.deposit().await.unwrap();
        rt.next_notice(|n| matches!(n, Notice::Rejected { .. })).await;

        assert!(rt.negotiator.recorded_requests().is_empty());
        assert!(rt.wallet.as_ref().unwrap().sent_transactions().is_empty());
        assert_eq!(rt.handle.state(), AppState::new());
    }

    #[tokio::test]
    async fn test_reconnect_to_other_account_rereads() {
        let chain = InMemoryChain::new();
        chain.fund(ALICE, ONE_ETH, 0);
        chain.fund(BOB, 3 * ONE_ETH, 0);
        let mut rt = TestRuntime::builder().chain(chain).build();
        rt.connected().await;

        rt.wallet.as_ref().unwrap().set_accounts(vec![BOB]);
        rt.handle.connect().await.unwrap();
        let state = rt
            .wait_for(|s| {
                s.connected_address() == Some(BOB) && s.balances.eth.to_string() == "3.0000"
            })
            .await;
        assert_eq!(state.balances.token.to_string(), "0.0000");
    }

    #[tokio::test]
    async fn test_failed_eth_read_shows_pending() {
        let chain = InMemoryChain::new();
        chain.fund(ALICE, ONE_ETH, ONE_ETH);
        chain.fail_eth_reads(true);
        let mut rt = TestRuntime::builder().chain(chain).build();
        rt.handle.connect().await.unwrap();

        let notice = rt.next_notice(|n| matches!(n, Notice::Failure(_))).await;
        assert!(matches!(notice, Notice::Failure(e) if e.kind == ErrorKind::Rpc));
        let state = rt.wait_for(|s| s.balances.token.amount().is_some()).await;
        assert_eq!(state.balances.eth, BalanceValue::Pending);
        assert_eq!(state.balances.token.to_string(), "1.0000");
    }

    #[tokio::test]
    async fn test_unreadable_ledger_shows_zero_offering() {
        let chain = InMemoryChain::new();
        chain.fund(ALICE, ONE_ETH, 0);
        chain.fail_deposit_reads(true);
        let mut rt = TestRuntime::builder().chain(chain).build();

        let state = rt.connected().await;
        assert_eq!(state.balances.deposit.to_string(), "0.0000");
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn test_explicit_refresh_is_idempotent() {
        let chain = InMemoryChain::new();
        chain.fund(ALICE, ONE_ETH, 2 * ONE_ETH);
        let mut rt = TestRuntime::builder().chain(chain).build();
        let first = rt.connected().await.balances;

        rt.handle.refresh().await.unwrap();
        rt.next_notice(|n| matches!(n, Notice::BalancesUpdated(_)))
            .await;
        let second = rt.handle.state().balances;

        assert_eq!(first, second);
        assert_ne!(second, BalanceSnapshot::pending());
        assert_eq!(rt.chain.read_count(), 2);
    }
}
