//! Test utilities and fake implementations of the collaborator traits
//!
//! These fakes script wallet, program-chain and attestation behavior without a
//! blockchain or the Iris API, so tests can drive the orchestrator through
//! transient mint failures, slow indexing and cancellation.

use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::chain::ChainId;
use crate::contracts::IERC20;
use crate::protocol::{
    AttestationStatus, DomainId, FinalityThreshold, MessageHeader, V2AttestationResponse,
    V2Message,
};
use crate::traits::{AttestationProvider, Clock, ProgramChainReader, ProgramSigner, WalletSession};
use crate::{Result, TransferError};

/// How a scripted submission fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakeFailure {
    /// Reported as `TransactionExecution`
    Transient,
    /// Reported as `Wallet`
    Rejected,
}

impl FakeFailure {
    fn into_error(self) -> TransferError {
        match self {
            Self::Transient => TransferError::TransactionExecution {
                reason: "execution reverted: simulated".to_string(),
            },
            Self::Rejected => TransferError::Wallet("User rejected the request".to_string()),
        }
    }
}

// ============================================================================
// Fake Wallet Session
// ============================================================================

#[derive(Debug, Default)]
struct WalletState {
    current_chain: ChainId,
    /// When false, switch requests are recorded but never take effect
    ignore_switches: bool,
    hang_switches: bool,
    switch_requests: Vec<ChainId>,
    sent: Vec<(ChainId, TransactionRequest)>,
    failures: HashMap<Address, VecDeque<FakeFailure>>,
    balance: U256,
}

/// A fake account-chain wallet.
///
/// This allows testing scenarios like:
/// - Wallet not connected
/// - Chain switches that never take effect
/// - Transient execution failures on a given contract
/// - User rejection
#[derive(Clone, Debug)]
pub struct FakeWalletSession {
    address: Option<Address>,
    state: Arc<Mutex<WalletState>>,
}

impl FakeWalletSession {
    pub fn connected(address: Address, chain_id: ChainId) -> Self {
        Self {
            address: Some(address),
            state: Arc::new(Mutex::new(WalletState {
                current_chain: chain_id,
                ..Default::default()
            })),
        }
    }

    pub fn disconnected(chain_id: ChainId) -> Self {
        Self {
            address: None,
            ..Self::connected(Address::ZERO, chain_id)
        }
    }

    /// Balance returned by every `balanceOf` call
    pub fn set_balance(&self, balance: U256) {
        self.state.lock().unwrap().balance = balance;
    }

    /// Make switch requests no-ops
    pub fn ignore_switches(&self) {
        self.state.lock().unwrap().ignore_switches = true;
    }

    /// Never answer switch requests, like a wallet prompt left open
    pub fn hang_switches(&self) {
        self.state.lock().unwrap().hang_switches = true;
    }

    /// Fail the next `times` transactions sent to `to`
    pub fn fail_transactions_to(&self, to: Address, failure: FakeFailure, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(to)
            .or_default()
            .extend(std::iter::repeat(failure).take(times));
    }

    /// Every chain the wallet was asked to switch to, in order
    pub fn switch_requests(&self) -> Vec<ChainId> {
        self.state.lock().unwrap().switch_requests.clone()
    }

    /// Every transaction that was accepted, with the chain it was bound to
    pub fn sent_transactions(&self) -> Vec<(ChainId, TransactionRequest)> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl WalletSession for FakeWalletSession {
    fn address(&self) -> Option<Address> {
        self.address
    }

    async fn current_chain(&self) -> Result<ChainId> {
        Ok(self.state.lock().unwrap().current_chain)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<()> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.switch_requests.push(chain_id);
            if !state.ignore_switches && !state.hang_switches {
                state.current_chain = chain_id;
            }
            state.hang_switches
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn send_transaction(&self, tx: TransactionRequest, chain_id: ChainId) -> Result<TxHash> {
        if self.address.is_none() {
            return Err(TransferError::WalletNotConnected);
        }

        let mut state = self.state.lock().unwrap();
        let to = tx.to.and_then(|kind| kind.to().copied());
        if let Some(queue) = to.and_then(|to| state.failures.get_mut(&to)) {
            if let Some(failure) = queue.pop_front() {
                return Err(failure.into_error());
            }
        }

        state.sent.push((chain_id, tx));
        let n = state.sent.len() as u64;
        Ok(TxHash::from(U256::from(n)))
    }

    async fn call(&self, tx: TransactionRequest, _chain_id: ChainId) -> Result<Bytes> {
        let balance = self.state.lock().unwrap().balance;
        let input = tx.input.input().cloned().unwrap_or_default();
        if input.starts_with(&IERC20::balanceOfCall::SELECTOR) {
            return Ok(IERC20::balanceOfCall::abi_encode_returns(&balance).into());
        }
        Err(TransferError::Provider("unexpected call".to_string()))
    }
}

// ============================================================================
// Fake Program Chain
// ============================================================================

/// A fake program-chain signer that records every submission.
///
/// Extra signers are recorded by public key.
#[derive(Clone, Debug)]
pub struct FakeProgramSigner {
    pubkey: Pubkey,
    submissions: Arc<Mutex<Vec<(Vec<Instruction>, Vec<Pubkey>)>>>,
    failures: Arc<Mutex<VecDeque<FakeFailure>>>,
}

impl Default for FakeProgramSigner {
    fn default() -> Self {
        Self {
            pubkey: Keypair::new().pubkey(),
            submissions: Arc::default(),
            failures: Arc::default(),
        }
    }
}

impl FakeProgramSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` submissions
    pub fn fail_next(&self, failure: FakeFailure, times: usize) {
        self.failures
            .lock()
            .unwrap()
            .extend(std::iter::repeat(failure).take(times));
    }

    pub fn submissions(&self) -> Vec<(Vec<Instruction>, Vec<Pubkey>)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgramSigner for FakeProgramSigner {
    fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    async fn send_instructions(
        &self,
        instructions: Vec<Instruction>,
        extra_signers: Vec<Keypair>,
    ) -> Result<Signature> {
        if let Some(failure) = self.failures.lock().unwrap().pop_front() {
            return Err(failure.into_error());
        }

        let mut submissions = self.submissions.lock().unwrap();
        submissions.push((
            instructions,
            extra_signers.iter().map(|k| k.pubkey()).collect(),
        ));
        Ok(Signature::from([submissions.len() as u8; 64]))
    }
}

/// A fake program-chain account store. Unknown accounts read as missing.
#[derive(Clone, Debug, Default)]
pub struct FakeChainReader {
    accounts: Arc<Mutex<HashMap<Pubkey, Vec<u8>>>>,
}

impl FakeChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, pubkey: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(pubkey, data);
    }
}

#[async_trait]
impl ProgramChainReader for FakeChainReader {
    async fn account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

/// One scripted Iris answer
#[derive(Clone, Debug)]
pub enum FakeIrisResponse {
    /// HTTP 404
    NotIndexed,
    /// A message with the given non-complete status
    Status(AttestationStatus),
    Complete { message: Bytes, attestation: Bytes },
    /// Any other HTTP or network failure
    TransportError,
}

/// A fake attestation provider that plays back a response sequence.
///
/// Each call returns the next response; once the sequence is exhausted the
/// last response repeats.
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    responses: Arc<Mutex<Vec<FakeIrisResponse>>>,
    calls: Arc<Mutex<Vec<(DomainId, String)>>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence(responses: Vec<FakeIrisResponse>) -> Self {
        let provider = Self::new();
        provider.set_sequence(responses);
        provider
    }

    pub fn set_sequence(&self, responses: Vec<FakeIrisResponse>) {
        *self.responses.lock().unwrap() = responses;
    }

    /// `not_indexed` 404s followed by a complete attestation
    pub fn not_indexed_then_complete(not_indexed: usize, message: Bytes, attestation: Bytes) -> Self {
        let mut responses = vec![FakeIrisResponse::NotIndexed; not_indexed];
        responses.push(FakeIrisResponse::Complete {
            message,
            attestation,
        });
        Self::with_sequence(responses)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every `(domain, tx id)` queried, in order
    pub fn calls(&self) -> Vec<(DomainId, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_id: &str,
    ) -> Result<Option<V2AttestationResponse>> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((source_domain, tx_id.to_string()));
            calls.len() - 1
        };

        let response = {
            let responses = self.responses.lock().unwrap();
            match responses.get(index).or(responses.last()) {
                Some(response) => response.clone(),
                None => FakeIrisResponse::NotIndexed,
            }
        };

        let message = |status, message, attestation| V2AttestationResponse {
            messages: vec![V2Message {
                status,
                message,
                attestation,
            }],
        };

        match response {
            FakeIrisResponse::NotIndexed => Ok(None),
            FakeIrisResponse::Status(status) => Ok(Some(message(status, None, None))),
            FakeIrisResponse::Complete {
                message: bytes,
                attestation,
            } => Ok(Some(message(
                AttestationStatus::Complete,
                Some(bytes),
                Some(attestation),
            ))),
            FakeIrisResponse::TransportError => Err(TransferError::AttestationTransportFailed {
                reason: "Iris API returned HTTP 500".to_string(),
            }),
        }
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// Sleeps return immediately after yielding to the scheduler, so a sleeping
/// task still gives cancellation a chance to run.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Every duration slept, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }

    pub fn clear_sleep_log(&self) {
        self.sleep_log.lock().unwrap().clear();
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
        tokio::task::yield_now().await;
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

// ============================================================================
// Message fixtures
// ============================================================================

/// A v2 burn message: header plus the start of a burn body carrying
/// `mint_recipient`
pub fn burn_message(
    source: DomainId,
    destination: DomainId,
    nonce: B256,
    mint_recipient: B256,
) -> Bytes {
    let header = MessageHeader {
        version: 1,
        source_domain: source.as_u32(),
        destination_domain: destination.as_u32(),
        nonce,
        sender: B256::ZERO,
        recipient: B256::ZERO,
        destination_caller: B256::ZERO,
        min_finality_threshold: FinalityThreshold::Fast.as_u32(),
        finality_threshold_executed: FinalityThreshold::Fast.as_u32(),
    };

    let mut bytes = header.encode();
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(B256::ZERO.as_slice());
    bytes.extend_from_slice(mint_recipient.as_slice());
    bytes.extend_from_slice(&[0u8; 64]);
    bytes.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(5)).await;
        clock.sleep(Duration::from_secs(10)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(15));
        assert_eq!(clock.now() - start, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_fake_attestation_provider_sequence() {
        let provider = FakeAttestationProvider::with_sequence(vec![
            FakeIrisResponse::NotIndexed,
            FakeIrisResponse::Status(AttestationStatus::Pending),
            FakeIrisResponse::Complete {
                message: Bytes::from(vec![1u8]),
                attestation: Bytes::from(vec![2u8]),
            },
        ]);

        assert!(provider
            .get_messages(DomainId::Ethereum, "0x1")
            .await
            .unwrap()
            .is_none());
        let pending = provider
            .get_messages(DomainId::Ethereum, "0x1")
            .await
            .unwrap()
            .unwrap();
        assert!(pending.first_complete().is_none());

        // last response repeats
        for _ in 0..2 {
            let done = provider
                .get_messages(DomainId::Ethereum, "0x1")
                .await
                .unwrap()
                .unwrap();
            assert!(done.first_complete().is_some());
        }
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test]
    async fn test_fake_wallet_scripted_failures() {
        let to = Address::repeat_byte(9);
        let wallet = FakeWalletSession::connected(Address::repeat_byte(1), 1);
        wallet.fail_transactions_to(to, FakeFailure::Transient, 2);

        for _ in 0..2 {
            let err = wallet
                .send_transaction(TransactionRequest::default().to(to), 1)
                .await
                .unwrap_err();
            assert!(err.is_transient_execution());
        }
        assert!(wallet
            .send_transaction(TransactionRequest::default().to(to), 1)
            .await
            .is_ok());
        // other targets unaffected
        assert!(wallet
            .send_transaction(TransactionRequest::default().to(Address::ZERO), 1)
            .await
            .is_ok());
        assert_eq!(wallet.sent_transactions().len(), 2);
    }

    #[test]
    fn test_burn_message_fixture() {
        let message = burn_message(
            DomainId::Ethereum,
            DomainId::Base,
            B256::repeat_byte(1),
            B256::repeat_byte(2),
        );
        let header = MessageHeader::decode(&message).unwrap();
        assert_eq!(header.source_domain_id(), Some(DomainId::Ethereum));
        assert_eq!(
            crate::protocol::burn_mint_recipient(&message),
            Some(B256::repeat_byte(2))
        );
    }
}
