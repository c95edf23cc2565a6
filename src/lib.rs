//! # cctp-transfer
//!
//! Cross-chain USDC transfers over Circle's Cross-Chain Transfer Protocol
//! (CCTP) v2, between EVM account chains and the Solana program chain.
//!
//! A [`TransferOrchestrator`] drives one transfer through approve → burn →
//! attestation → mint, switching the connected wallet between chains,
//! translating addresses and domains, polling Circle's Iris API and retrying
//! the mint in place while the destination chain catches up.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cctp_transfer::adapter::{build_adapters, ProgramChainAccess};
//! use cctp_transfer::providers::{AlloyWalletSession, TokioClock};
//! use cctp_transfer::{
//!     ChainRegistry, Settings, TransferError, TransferMode, TransferOrchestrator,
//!     TransferRequest,
//! };
//!
//! # async fn example(wallet: AlloyWalletSession) -> Result<(), TransferError> {
//! let settings = Settings::from_env();
//! let registry = ChainRegistry::testnet();
//! let wallet = Arc::new(wallet);
//! let program: ProgramChainAccess = (
//!     Arc::new(settings.solana_signer()?),
//!     Arc::new(settings.solana_reader()),
//! );
//!
//! let orchestrator = TransferOrchestrator::builder()
//!     .adapters(build_adapters(&registry, wallet.clone(), Some(program))?)
//!     .registry(registry)
//!     .wallet(wallet)
//!     .attestation_provider(Arc::new(settings.attestation_provider()))
//!     .clock(Arc::new(TokioClock::new()))
//!     .build();
//!
//! // Ethereum Sepolia → Solana devnet
//! let outcome = orchestrator
//!     .execute_transfer(
//!         TransferRequest::builder()
//!             .source_chain_id(11155111)
//!             .destination_chain_id(103)
//!             .amount("1.5")
//!             .destination_address("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")
//!             .transfer_mode(TransferMode::Standard)
//!             .build(),
//!     )
//!     .await?;
//!
//! for entry in orchestrator.logs() {
//!     println!("{entry}");
//! }
//! println!("burn {} / mint {}", outcome.burn_tx, outcome.mint_tx);
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`TransferOrchestrator`], [`TransferRequest`], [`TransferOutcome`],
//!   [`TransferState`], [`LogEntry`] - the transfer state machine
//! - [`adapter`] - per-chain-family balance / approve / burn / mint
//! - [`ChainRegistry`] and [`ChainDescriptor`] - supported chains
//! - [`WalletSession`], [`ProgramSigner`], [`ProgramChainReader`],
//!   [`AttestationProvider`], [`Clock`] - collaborator seams, with production
//!   implementations in [`providers`] and fakes in [`testing`]
//! - [`TransferError`], [`ErrorKind`] and [`Result`] - error handling

pub mod adapter;
pub mod address;
mod chain;
mod config;
pub mod contracts;
mod error;
mod orchestrator;
mod poller;
mod protocol;
pub mod providers;
pub mod testing;
mod traits;

pub use chain::addresses;
pub use chain::{
    ChainDescriptor, ChainId, ChainKind, ChainRegistry, NativeAddress, CODEX_TESTNET_CHAIN_ID,
    LINEA_SEPOLIA_CHAIN_ID, SOLANA_DEVNET_CHAIN_ID, SONIC_BLAZE_CHAIN_ID,
    UNICHAIN_SEPOLIA_CHAIN_ID, WORLDCHAIN_SEPOLIA_CHAIN_ID,
};
pub use config::{MintRetryPolicy, OrchestratorConfig, PollingConfig, Settings};
pub use error::{ErrorKind, Result, TransferError};
pub use orchestrator::{
    LogEntry, TransferOrchestrator, TransferOutcome, TransferRequest, TransferState,
    TransferTransactions, TransitionCallback,
};
pub use poller::AttestationPoller;
pub use protocol::{
    burn_mint_recipient, format_units, AmountUnits, Attestation, AttestationStatus, DomainId,
    FinalityThreshold, InvalidDomainId, MessageHeader, TransferMode, V2AttestationResponse,
    V2Message, USDC_DECIMALS,
};
pub use traits::{AttestationProvider, Clock, ProgramChainReader, ProgramSigner, WalletSession};

// Public module for advanced users who need custom instrumentation
pub mod spans;
