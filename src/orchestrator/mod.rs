// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cross-chain transfer orchestrator
//!
//! Sequences approve → burn → await attestation → mint across two chains,
//! translating addresses and domains between chain families, retrying the
//! mint in place on transient failures, and streaming progress as log entries
//! and state transitions.

mod request;
mod state;

pub use request::{TransferOutcome, TransferRequest, TransferTransactions};
pub use state::{LogEntry, TransferState};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::B256;
use bon::Builder;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};

use crate::adapter::pda::associated_token_address;
use crate::adapter::{BurnParams, ChainAdapter, TxHandle};
use crate::address::parse_native_address;
use crate::chain::{ChainDescriptor, ChainId, ChainRegistry, NativeAddress};
use crate::config::OrchestratorConfig;
use crate::error::{ErrorKind, Result, TransferError};
use crate::poller::AttestationPoller;
use crate::protocol::{AmountUnits, Attestation, FinalityThreshold};
use crate::spans;
use crate::traits::{AttestationProvider, Clock, WalletSession};

/// Called with `(from, to)` on every state change
pub type TransitionCallback = Arc<dyn Fn(TransferState, TransferState) + Send + Sync>;

#[derive(Default)]
struct Inner {
    generation: u64,
    running: bool,
    state: TransferState,
    logs: Vec<LogEntry>,
    last_error: Option<(ErrorKind, String)>,
    transactions: TransferTransactions,
    cancel: CancellationToken,
}

/// Step a collaborator failure is attributed to
#[derive(Debug, Clone, Copy)]
enum Step {
    Approve,
    Burn,
    Mint { attempts: u32 },
}

impl Step {
    /// Wraps collaborator failures into the step's error; classified errors
    /// pass through unchanged
    fn wrap(self, err: TransferError) -> TransferError {
        match err {
            TransferError::TransactionExecution { .. }
            | TransferError::MintRetryable { .. }
            | TransferError::Wallet(_)
            | TransferError::Provider(_)
            | TransferError::Rpc(_)
            | TransferError::Network(_)
            | TransferError::Abi(_)
            | TransferError::Json(_)
            | TransferError::Hex(_) => {
                let reason = err.to_string();
                match self {
                    Self::Approve => TransferError::ApprovalFailed { reason },
                    Self::Burn => TransferError::BurnFailed { reason },
                    Self::Mint { attempts } => TransferError::MintFailed { attempts, reason },
                }
            }
            other => other,
        }
    }
}

/// Both ends of a validated request
struct Route {
    source: Arc<dyn ChainAdapter>,
    destination: Arc<dyn ChainAdapter>,
    amount: AmountUnits,
    burn: BurnParams,
}

/// Drives one transfer at a time.
///
/// Progress is observable three ways: [`logs`](Self::logs) for the
/// human-readable trail, [`subscribe`](Self::subscribe) for the current
/// state, and [`on_transition`](Self::on_transition) callbacks.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use cctp_transfer::adapter::build_adapters;
/// use cctp_transfer::providers::{AlloyWalletSession, TokioClock};
/// use cctp_transfer::{ChainRegistry, Settings, TransferOrchestrator, TransferRequest};
///
/// # async fn example(wallet: AlloyWalletSession) -> Result<(), cctp_transfer::TransferError> {
/// let settings = Settings::from_env();
/// let registry = ChainRegistry::testnet();
/// let wallet = Arc::new(wallet);
///
/// let orchestrator = TransferOrchestrator::builder()
///     .adapters(build_adapters(&registry, wallet.clone(), None)?)
///     .registry(registry)
///     .wallet(wallet)
///     .attestation_provider(Arc::new(settings.attestation_provider()))
///     .clock(Arc::new(TokioClock::new()))
///     .build();
///
/// orchestrator.on_transition(|from, to| println!("{from} -> {to}"));
///
/// let outcome = orchestrator
///     .execute_transfer(
///         TransferRequest::builder()
///             .source_chain_id(11155111)
///             .destination_chain_id(84532)
///             .amount("10")
///             .destination_address("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d")
///             .build(),
///     )
///     .await?;
/// println!("minted in {}", outcome.mint_tx);
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct TransferOrchestrator {
    #[builder(into)]
    registry: Arc<ChainRegistry>,
    wallet: Arc<dyn WalletSession>,
    /// One adapter per chain that may appear in a request
    #[builder(with = |adapters: Vec<Arc<dyn ChainAdapter>>| {
        adapters.into_iter().map(|a| (a.descriptor().id, a)).collect()
    })]
    adapters: HashMap<ChainId, Arc<dyn ChainAdapter>>,
    attestation_provider: Arc<dyn AttestationProvider>,
    clock: Arc<dyn Clock>,
    #[builder(default)]
    config: OrchestratorConfig,

    #[builder(skip)]
    inner: Mutex<Inner>,
    #[builder(skip = watch::channel(TransferState::Idle).0)]
    state_tx: watch::Sender<TransferState>,
    #[builder(skip)]
    callbacks: Mutex<Vec<TransitionCallback>>,
}

/// Clears the running flag however the transfer future ends, dropped
/// mid-flight included
struct RunGuard<'a> {
    orchestrator: &'a TransferOrchestrator,
    generation: u64,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.orchestrator.lock();
        if inner.generation == self.generation {
            inner.running = false;
        }
    }
}

impl TransferOrchestrator {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// The adapter serving `chain_id`
    pub fn adapter(&self, chain_id: ChainId) -> Result<&Arc<dyn ChainAdapter>> {
        self.adapters
            .get(&chain_id)
            .ok_or_else(|| TransferError::unsupported_chain(chain_id))
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn state(&self) -> TransferState {
        self.lock().state
    }

    /// Log entries of the current (or last) transfer, oldest first
    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().logs.clone()
    }

    /// Kind and message of the failure that moved the machine to Failed
    pub fn last_error(&self) -> Option<(ErrorKind, String)> {
        self.lock().last_error.clone()
    }

    /// Handles the current (or last) transfer produced so far, kept after a
    /// failure so a burn can still be recovered
    pub fn last_transactions(&self) -> TransferTransactions {
        self.lock().transactions.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// A receiver that always holds the current state
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state_tx.subscribe()
    }

    /// Registers a callback run synchronously on every state change
    pub fn on_transition<F>(&self, callback: F)
    where
        F: Fn(TransferState, TransferState) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    // ========================================================================
    // Balances
    // ========================================================================

    /// Token balance of the connected owner on `chain_id`
    pub async fn balance(&self, chain_id: ChainId) -> Result<String> {
        let adapter = self.adapter(chain_id)?;
        let owner = adapter.owner().ok_or(TransferError::WalletNotConnected)?;
        adapter.balance(&owner).await
    }

    /// Token balance of `address` (native format) on `chain_id`
    pub async fn balance_of(&self, chain_id: ChainId, address: &str) -> Result<String> {
        let adapter = self.adapter(chain_id)?;
        let owner = parse_native_address(address, adapter.descriptor().kind)?;
        adapter.balance(&owner).await
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Returns to Idle, clearing logs and the retained error.
    ///
    /// A transfer still in flight is cancelled; whatever it does afterwards
    /// is discarded.
    pub fn reset(&self) {
        let from = {
            let mut inner = self.lock();
            inner.cancel.cancel();
            inner.generation += 1;
            inner.cancel = CancellationToken::new();
            inner.running = false;
            inner.logs.clear();
            inner.last_error = None;
            inner.transactions = TransferTransactions::default();
            std::mem::replace(&mut inner.state, TransferState::Idle)
        };
        info!(event = "transfer_reset");
        self.notify(from, TransferState::Idle);
    }

    /// Stops the transfer in flight, if any.
    ///
    /// Unlike [`reset`](Self::reset) nothing is cleared: the transfer ends in
    /// Failed with [`TransferError::Cancelled`] retained, and its log and
    /// transaction handles stay readable.
    pub fn cancel(&self) {
        let inner = self.lock();
        if inner.running {
            info!(generation = inner.generation, event = "transfer_cancel_requested");
            inner.cancel.cancel();
        }
    }

    /// Runs a transfer to completion.
    ///
    /// On failure the machine is left in Failed with the error retained, an
    /// `Error: ...` entry is logged, and the error is returned.
    ///
    /// # Errors
    ///
    /// - [`TransferError::TransferInProgress`] while another transfer runs
    /// - [`TransferError::Cancelled`] if [`cancel`](Self::cancel) or
    ///   [`reset`](Self::reset) interrupts it
    /// - the classified error of the failing step otherwise
    pub async fn execute_transfer(&self, request: TransferRequest) -> Result<TransferOutcome> {
        let (generation, cancel) = self.begin()?;
        let _guard = RunGuard {
            orchestrator: self,
            generation,
        };

        let span = spans::execute_transfer(
            request.source_chain_id,
            request.destination_chain_id,
            &request.amount,
            FinalityThreshold::from(request.transfer_mode),
            generation,
        );

        let result = self
            .run(generation, &cancel, &request)
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                spans::record_error(&err);
                self.fail(generation, &err);
                Err(err)
            }
        }
    }

    fn begin(&self) -> Result<(u64, CancellationToken)> {
        let (from, generation, cancel) = {
            let mut inner = self.lock();
            if inner.running {
                return Err(TransferError::TransferInProgress);
            }
            inner.generation += 1;
            inner.running = true;
            inner.cancel = CancellationToken::new();
            inner.logs.clear();
            inner.last_error = None;
            inner.transactions = TransferTransactions::default();
            let from = std::mem::replace(&mut inner.state, TransferState::Idle);
            (from, inner.generation, inner.cancel.clone())
        };
        self.notify(from, TransferState::Idle);
        Ok((generation, cancel))
    }

    async fn run(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        request: &TransferRequest,
    ) -> Result<TransferOutcome> {
        let route = self.route(request)?;
        let source = route.source.descriptor().clone();
        let destination = route.destination.descriptor().clone();
        info!(
            source = %source.name,
            destination = %destination.name,
            amount = %route.amount,
            max_fee = route.burn.max_fee,
            finality = %route.burn.finality,
            event = "transfer_started"
        );

        // approve
        if !source.is_program_chain() {
            self.ensure_chain(generation, cancel, &source).await?;
        }
        self.transition(generation, TransferState::Approving)?;
        if !source.is_program_chain() {
            self.log(generation, "Approving USDC transfer...");
        }
        let approve_tx = self
            .cancellable(cancel, route.source.approve(&source.burn_contract, route.amount))
            .await
            .map_err(|e| Step::Approve.wrap(e))?;
        self.record(generation, |t| t.approve_tx = Some(approve_tx));
        if !source.is_program_chain() {
            self.log(generation, format!("USDC Approval Tx: {approve_tx}"));
        }
        self.check(generation, cancel)?;

        // burn
        self.transition(generation, TransferState::Burning)?;
        self.log(generation, burn_message(&source));
        let burn_tx = self
            .cancellable(cancel, route.source.burn(&route.burn))
            .await
            .map_err(|e| Step::Burn.wrap(e))?;
        self.record(generation, |t| t.burn_tx = Some(burn_tx));
        self.log(generation, burned_message(&source, &burn_tx));
        self.check(generation, cancel)?;

        // attest
        self.transition(generation, TransferState::WaitingAttestation)?;
        self.log(generation, "Retrieving attestation...");
        let poller = AttestationPoller::new(
            self.attestation_provider.clone(),
            self.clock.clone(),
            self.config.polling,
        );
        let attestation = poller
            .await_attestation(&burn_tx.id(), source.bridge_domain, cancel, |_| {
                self.log(generation, "Waiting for attestation...");
            })
            .await?;
        self.log(generation, "Attestation retrieved!");

        // mint
        if !destination.is_program_chain() {
            self.ensure_chain(generation, cancel, &destination).await?;
        }
        self.transition(generation, TransferState::Minting)?;
        let (mint_tx, mint_attempts) = self
            .mint_with_retry(generation, cancel, route.destination.as_ref(), &attestation)
            .await?;
        self.record(generation, |t| t.mint_tx = Some(mint_tx));
        self.log(generation, minted_message(&destination, &mint_tx));
        self.transition(generation, TransferState::Completed)?;

        info!(
            burn_tx = %burn_tx,
            mint_tx = %mint_tx,
            mint_attempts,
            event = "transfer_completed"
        );
        Ok(TransferOutcome {
            approve_tx,
            burn_tx,
            mint_tx,
            attestation,
            mint_attempts,
        })
    }

    /// Resolves both chains and translates the request into burn parameters
    fn route(&self, request: &TransferRequest) -> Result<Route> {
        if request.source_chain_id == request.destination_chain_id {
            return Err(TransferError::UnsupportedChain {
                chain: format!(
                    "{} (source and destination are the same chain)",
                    request.source_chain_id
                ),
            });
        }

        let source_descriptor = self.registry.descriptor(request.source_chain_id)?;
        let destination_descriptor = self.registry.descriptor(request.destination_chain_id)?;
        let source = self.adapter(source_descriptor.id)?.clone();
        let destination = self.adapter(destination_descriptor.id)?.clone();

        let amount = AmountUnits::parse(&request.amount, source_descriptor.decimals)?;
        let max_fee = amount.max_fee()?;

        let uses_account_wallet =
            !source_descriptor.is_program_chain() || !destination_descriptor.is_program_chain();
        if uses_account_wallet && self.wallet.address().is_none() {
            return Err(TransferError::WalletNotConnected);
        }

        let recipient =
            parse_native_address(&request.destination_address, destination_descriptor.kind)?;
        let mint_recipient = match recipient {
            NativeAddress::Account(address) => address.into_word(),
            NativeAddress::Program(owner) => {
                let mint = destination_descriptor.token.as_program().ok_or_else(|| {
                    TransferError::InvalidConfig(format!(
                        "{} has no program chain token",
                        destination_descriptor.name
                    ))
                })?;
                B256::from(associated_token_address(&owner, &mint).to_bytes())
            }
        };

        // a program-chain burn is relayed by the connected account wallet
        let destination_caller = if source_descriptor.is_program_chain() {
            self.wallet
                .address()
                .ok_or(TransferError::WalletNotConnected)?
                .into_word()
        } else {
            B256::ZERO
        };

        Ok(Route {
            source,
            destination,
            amount,
            burn: BurnParams {
                amount,
                destination_domain: destination_descriptor.bridge_domain,
                mint_recipient,
                destination_caller,
                max_fee,
                finality: request.transfer_mode.into(),
            },
        })
    }

    /// Asks the wallet to move to `chain` if it is elsewhere, then waits the
    /// settle delay. Transactions carry their chain id, so a switch that has
    /// not taken effect is only reported.
    async fn ensure_chain(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        chain: &ChainDescriptor,
    ) -> Result<()> {
        if self.cancellable(cancel, self.wallet.current_chain()).await? == chain.id {
            return Ok(());
        }

        self.log(generation, format!("Switching to {}...", chain.name));
        self.cancellable(cancel, self.wallet.switch_chain(chain.id)).await?;
        self.sleep(cancel, self.config.settle_delay).await?;

        let active = self
            .cancellable(cancel, self.wallet.current_chain())
            .await?;
        if active != chain.id {
            warn!(
                expected_chain = chain.id,
                active_chain = active,
                event = "chain_switch_unconfirmed"
            );
        }
        self.check(generation, cancel)
    }

    async fn mint_with_retry(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        destination: &dyn ChainAdapter,
        attestation: &Attestation,
    ) -> Result<(TxHandle, u32)> {
        let policy = self.config.mint_retry;
        let chain = destination.descriptor();
        self.log(generation, mint_message(chain));

        let mut attempt: u32 = 1;
        loop {
            let span = spans::receive_message(chain.id, attempt, attestation.attestation.len());
            let minted = self
                .cancellable(cancel, destination.mint(attestation).instrument(span))
                .await;
            match minted {
                Ok(tx) => return Ok((tx, attempt)),
                Err(err) if err.is_transient_execution() && attempt < policy.max_attempts => {
                    let retryable = TransferError::MintRetryable {
                        reason: err.to_string(),
                    };
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        error = %retryable,
                        event = "mint_retry_scheduled"
                    );
                    self.log(
                        generation,
                        format!("Retry {attempt}/{}...", policy.max_attempts),
                    );
                    self.sleep(cancel, policy.delay_for(attempt)).await?;
                    self.check(generation, cancel)?;
                    attempt += 1;
                }
                Err(err) => return Err(Step::Mint { attempts: attempt }.wrap(err)),
            }
        }
    }

    // ========================================================================
    // Generation-checked mutations
    // ========================================================================

    /// Races a collaborator call against cancellation
    async fn cancellable<T, F>(&self, cancel: &CancellationToken, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransferError::Cancelled),
            result = call => result,
        }
    }

    async fn sleep(&self, cancel: &CancellationToken, duration: std::time::Duration) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransferError::Cancelled),
            _ = self.clock.sleep(duration) => Ok(()),
        }
    }

    fn check(&self, generation: u64, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() || self.lock().generation != generation {
            return Err(TransferError::Cancelled);
        }
        Ok(())
    }

    fn log(&self, generation: u64, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        info!(message = %message, event = "transfer_log");
        inner.logs.push(LogEntry::now(message));
    }

    fn record(&self, generation: u64, update: impl FnOnce(&mut TransferTransactions)) {
        let mut inner = self.lock();
        if inner.generation == generation {
            update(&mut inner.transactions);
        }
    }

    fn transition(&self, generation: u64, to: TransferState) -> Result<()> {
        let from = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return Err(TransferError::Cancelled);
            }
            std::mem::replace(&mut inner.state, to)
        };
        info!(from = %from, to = %to, event = "transfer_state_changed");
        self.notify(from, to);
        Ok(())
    }

    fn fail(&self, generation: u64, err: &TransferError) {
        let from = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            let message = err.to_string();
            inner.logs.push(LogEntry::now(format!("Error: {message}")));
            inner.last_error = Some((err.kind(), message));
            std::mem::replace(&mut inner.state, TransferState::Failed)
        };
        error!(error = %err, kind = ?err.kind(), event = "transfer_failed");
        self.notify(from, TransferState::Failed);
    }

    fn notify(&self, from: TransferState, to: TransferState) {
        self.state_tx.send_replace(to);
        if from == to {
            return;
        }
        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for callback in callbacks {
            callback(from, to);
        }
    }
}

impl std::fmt::Debug for TransferOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("TransferOrchestrator")
            .field("chains", &self.adapters.keys().collect::<Vec<_>>())
            .field("state", &inner.state)
            .field("generation", &inner.generation)
            .field("config", &self.config)
            .finish()
    }
}

fn burn_message(source: &ChainDescriptor) -> &'static str {
    if source.is_program_chain() {
        "Burning Solana USDC..."
    } else {
        "Burning USDC..."
    }
}

fn burned_message(source: &ChainDescriptor, tx: &TxHandle) -> String {
    if source.is_program_chain() {
        format!("Solana burn transaction: {tx}")
    } else {
        format!("Burn Tx: {tx}")
    }
}

fn mint_message(destination: &ChainDescriptor) -> &'static str {
    if destination.is_program_chain() {
        "Minting Solana USDC..."
    } else {
        "Minting USDC..."
    }
}

fn minted_message(destination: &ChainDescriptor, tx: &TxHandle) -> String {
    if destination.is_program_chain() {
        format!("Solana mint transaction: {tx}")
    } else {
        format!("Mint Tx: {tx}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_wraps_collaborator_errors() {
        let execution = || TransferError::TransactionExecution {
            reason: "reverted".to_string(),
        };
        assert_eq!(
            Step::Approve.wrap(execution()).kind(),
            ErrorKind::ApprovalFailed
        );
        assert_eq!(
            Step::Burn.wrap(TransferError::Wallet("rejected".into())).kind(),
            ErrorKind::BurnFailed
        );
        let minted = Step::Mint { attempts: 5 }.wrap(execution());
        insta::assert_snapshot!(
            minted.to_string(),
            @"Mint failed after 5 attempt(s): Transaction execution failed: reverted"
        );
    }

    #[test]
    fn test_step_keeps_classified_errors() {
        for err in [
            TransferError::WalletNotConnected,
            TransferError::Cancelled,
            TransferError::unsupported_chain(1u64),
            TransferError::SolanaKeyFormatInvalid,
        ] {
            let kind = err.kind();
            assert_eq!(Step::Burn.wrap(err).kind(), kind);
        }
    }
}
