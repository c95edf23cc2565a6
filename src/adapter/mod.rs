//! Chain adapters: one implementation per chain family behind a common
//! balance / approve / burn / mint surface

mod account;
pub mod pda;
mod program;

pub use account::AccountChainAdapter;
pub use program::ProgramChainAdapter;

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{TxHash, B256};
use async_trait::async_trait;
use solana_sdk::signature::Signature;
use tracing::debug;

use crate::chain::{ChainDescriptor, ChainRegistry, NativeAddress};
use crate::error::Result;
use crate::protocol::{AmountUnits, Attestation, DomainId, FinalityThreshold};
use crate::traits::{ProgramChainReader, ProgramSigner, WalletSession};

/// Identifier of a submitted (or deliberately skipped) step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxHandle {
    Account(TxHash),
    Program(Signature),
    /// The chain needed no transaction for this step
    Skipped,
}

impl TxHandle {
    /// The id Iris indexes burns by: `0x`-hex hash or base58 signature
    pub fn id(&self) -> String {
        match self {
            Self::Account(hash) => hash.to_string(),
            Self::Program(signature) => signature.to_string(),
            Self::Skipped => String::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped"),
            other => f.write_str(&other.id()),
        }
    }
}

/// Everything a burn needs, already translated to the 32-byte message format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnParams {
    pub amount: AmountUnits,
    pub destination_domain: DomainId,
    pub mint_recipient: B256,
    /// Zero lets anyone submit the mint
    pub destination_caller: B256,
    pub max_fee: u64,
    pub finality: FinalityThreshold,
}

/// Capabilities the orchestrator needs from a chain.
///
/// Failures are reported with the collaborator's classification
/// (`TransactionExecution` for transient execution failures, `Wallet` or
/// `Provider` otherwise); the orchestrator maps them to the failing step.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn descriptor(&self) -> &ChainDescriptor;

    /// The connected owner on this chain, if any
    fn owner(&self) -> Option<NativeAddress>;

    /// Token balance of `owner` as a decimal string
    async fn balance(&self, owner: &NativeAddress) -> Result<String>;

    /// Lets `spender` move `amount` of the token on the owner's behalf
    async fn approve(&self, spender: &NativeAddress, amount: AmountUnits) -> Result<TxHandle>;

    async fn burn(&self, params: &BurnParams) -> Result<TxHandle>;

    async fn mint(&self, attestation: &Attestation) -> Result<TxHandle>;
}

/// Program-chain collaborators, when the program chain is in use
pub type ProgramChainAccess = (Arc<dyn ProgramSigner>, Arc<dyn ProgramChainReader>);

/// One adapter per chain in `registry`.
///
/// Account chains share `wallet`. Program chains are skipped when `program` is
/// `None`, so requests touching them fail with `UnsupportedChain`.
pub fn build_adapters(
    registry: &ChainRegistry,
    wallet: Arc<dyn WalletSession>,
    program: Option<ProgramChainAccess>,
) -> Result<Vec<Arc<dyn ChainAdapter>>> {
    let mut adapters: Vec<Arc<dyn ChainAdapter>> = Vec::with_capacity(registry.len());
    for descriptor in registry.iter() {
        if descriptor.is_program_chain() {
            let Some((signer, reader)) = &program else {
                debug!(chain = %descriptor.name, event = "program_chain_adapter_skipped");
                continue;
            };
            adapters.push(Arc::new(ProgramChainAdapter::new(
                descriptor.clone(),
                signer.clone(),
                reader.clone(),
                registry,
            )?));
        } else {
            adapters.push(Arc::new(AccountChainAdapter::new(
                descriptor.clone(),
                wallet.clone(),
            )?));
        }
    }
    Ok(adapters)
}
