//! Collaborator seams of the transfer orchestrator.
//!
//! Every network-facing or time-dependent capability the orchestrator relies
//! on sits behind one of these traits, so tests can substitute fakes that
//! script failures and fast-forward time. Production implementations live in
//! [`providers`](crate::providers).
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use cctp_transfer::{AttestationProvider, DomainId, V2AttestationResponse};
//!
//! struct NeverIndexed;
//!
//! #[async_trait::async_trait]
//! impl AttestationProvider for NeverIndexed {
//!     async fn get_messages(&self, _: DomainId, _: &str)
//!         -> cctp_transfer::Result<Option<V2AttestationResponse>> {
//!         Ok(None)
//!     }
//! }
//! ```

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use std::time::{Duration, Instant};

use crate::chain::ChainId;
use crate::error::Result;
use crate::protocol::{DomainId, V2AttestationResponse};

/// A connected account-chain wallet able to sign on several chains.
///
/// The wallet has one active chain at a time. Switching is a request: callers
/// must not assume it has taken effect until they observe it through
/// [`current_chain`](Self::current_chain).
///
/// Implementations report transient execution failures (the destination chain
/// not having caught up yet, nonce races) as
/// [`TransferError::TransactionExecution`](crate::TransferError::TransactionExecution)
/// and every other signing or submission failure as
/// [`TransferError::Wallet`](crate::TransferError::Wallet).
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The connected account, or `None` while disconnected
    fn address(&self) -> Option<Address>;

    /// The chain the wallet is currently on
    async fn current_chain(&self) -> Result<ChainId>;

    /// Asks the wallet to move to `chain_id`
    async fn switch_chain(&self, chain_id: ChainId) -> Result<()>;

    /// Signs and submits `tx` on `chain_id`, returning once it is mined
    async fn send_transaction(&self, tx: TransactionRequest, chain_id: ChainId) -> Result<TxHash>;

    /// Executes a read-only call against `chain_id`
    async fn call(&self, tx: TransactionRequest, chain_id: ChainId) -> Result<Bytes>;
}

/// Signs and submits instructions on the program chain.
#[async_trait]
pub trait ProgramSigner: Send + Sync {
    /// Fee payer and owner of the token accounts being burned from or minted to
    fn pubkey(&self) -> Pubkey;

    /// Submits `instructions` in one transaction signed by the payer and every
    /// keypair in `extra_signers`, returning once it is confirmed
    async fn send_instructions(
        &self,
        instructions: Vec<Instruction>,
        extra_signers: Vec<Keypair>,
    ) -> Result<Signature>;
}

/// Read access to program-chain account state.
#[async_trait]
pub trait ProgramChainReader: Send + Sync {
    /// Raw data of `pubkey`, or `None` if the account does not exist
    async fn account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>>;
}

/// Attestation lookups against Circle's Iris API.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Burns that take several polls to be indexed (404)
/// - State transitions (pending → pending_confirmations → complete)
/// - Transport failures
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Fetches the messages emitted by `tx_id` on `source_domain`.
    ///
    /// Returns `Ok(None)` while the service has not indexed the transaction
    /// yet (HTTP 404).
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::AttestationTransportFailed`](crate::TransferError::AttestationTransportFailed)
    /// for every other HTTP or network failure.
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_id: &str,
    ) -> Result<Option<V2AttestationResponse>>;
}

/// Trait for time-based operations.
///
/// Lets tests advance through polling loops and retry delays without waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);

    fn now(&self) -> Instant;
}
