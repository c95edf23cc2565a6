use bon::Builder;

use crate::adapter::TxHandle;
use crate::chain::ChainId;
use crate::protocol::{Attestation, TransferMode};

/// What the user asked to move, as entered
///
/// ```rust
/// use cctp_transfer::{TransferMode, TransferRequest};
///
/// let request = TransferRequest::builder()
///     .source_chain_id(11155111)
///     .destination_chain_id(84532)
///     .amount("10")
///     .destination_address("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d")
///     .build();
/// assert_eq!(request.transfer_mode, TransferMode::Fast);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct TransferRequest {
    pub source_chain_id: ChainId,
    pub destination_chain_id: ChainId,
    /// Decimal amount such as `"1.5"`
    #[builder(into)]
    pub amount: String,
    /// Recipient in the destination chain's native format
    #[builder(into)]
    pub destination_address: String,
    #[builder(default)]
    pub transfer_mode: TransferMode,
}

/// Handles of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// [`TxHandle::Skipped`] when the source chain needs no approval
    pub approve_tx: TxHandle,
    pub burn_tx: TxHandle,
    pub mint_tx: TxHandle,
    pub attestation: Attestation,
    /// Mint submissions, including the successful one
    pub mint_attempts: u32,
}

/// Handles produced so far by the current or last transfer
///
/// Filled in as each step lands, so a transfer that fails after burning still
/// reports the burn to recover from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferTransactions {
    pub approve_tx: Option<TxHandle>,
    pub burn_tx: Option<TxHandle>,
    pub mint_tx: Option<TxHandle>,
}
