//! Alloy-backed account-chain wallet session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_json_rpc::RpcError;
use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::chain::ChainId;
use crate::error::{Result, TransferError};
use crate::traits::WalletSession;

/// Wallet session over one signing alloy provider per chain.
///
/// Each provider must already carry the wallet filler for `address`; the
/// session only routes requests by chain id and tracks which chain is active.
///
/// # Examples
///
/// ```rust,no_run
/// use alloy_provider::{Provider, ProviderBuilder};
/// use cctp_transfer::providers::AlloyWalletSession;
///
/// # async fn example(wallet: alloy_network::EthereumWallet, from: alloy_primitives::Address)
/// #     -> Result<(), Box<dyn std::error::Error>> {
/// let sepolia = ProviderBuilder::new()
///     .wallet(wallet.clone())
///     .connect("https://ethereum-sepolia-rpc.publicnode.com")
///     .await?
///     .erased();
/// let base = ProviderBuilder::new()
///     .wallet(wallet)
///     .connect("https://sepolia.base.org")
///     .await?
///     .erased();
///
/// let session = AlloyWalletSession::new(from, 11155111)
///     .with_chain(11155111, sepolia)
///     .with_chain(84532, base);
/// # Ok(())
/// # }
/// ```
pub struct AlloyWalletSession {
    address: Address,
    providers: HashMap<ChainId, DynProvider>,
    active_chain: AtomicU64,
}

impl AlloyWalletSession {
    pub fn new(address: Address, initial_chain: ChainId) -> Self {
        Self {
            address,
            providers: HashMap::new(),
            active_chain: AtomicU64::new(initial_chain),
        }
    }

    /// Registers the provider used for `chain_id`
    pub fn with_chain(mut self, chain_id: ChainId, provider: DynProvider) -> Self {
        self.providers.insert(chain_id, provider);
        self
    }

    fn provider(&self, chain_id: ChainId) -> Result<&DynProvider> {
        self.providers
            .get(&chain_id)
            .ok_or_else(|| TransferError::unsupported_chain(chain_id))
    }
}

impl std::fmt::Debug for AlloyWalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyWalletSession")
            .field("address", &self.address)
            .field("chains", &self.providers.keys().collect::<Vec<_>>())
            .field("active_chain", &self.active_chain.load(Ordering::SeqCst))
            .finish()
    }
}

/// JSON-RPC error responses (reverts during estimation, nonce races) are the
/// transient class; anything else is a wallet failure.
fn classify_send_error(err: RpcError<TransportErrorKind>) -> TransferError {
    match err {
        RpcError::ErrorResp(payload) => TransferError::TransactionExecution {
            reason: payload.to_string(),
        },
        other => TransferError::Wallet(other.to_string()),
    }
}

#[async_trait]
impl WalletSession for AlloyWalletSession {
    fn address(&self) -> Option<Address> {
        Some(self.address)
    }

    async fn current_chain(&self) -> Result<ChainId> {
        Ok(self.active_chain.load(Ordering::SeqCst))
    }

    #[instrument(skip(self))]
    async fn switch_chain(&self, chain_id: ChainId) -> Result<()> {
        self.provider(chain_id)?;
        let previous = self.active_chain.swap(chain_id, Ordering::SeqCst);
        info!(
            from_chain = previous,
            to_chain = chain_id,
            event = "wallet_chain_switched"
        );
        Ok(())
    }

    #[instrument(skip(self, tx))]
    async fn send_transaction(
        &self,
        mut tx: TransactionRequest,
        chain_id: ChainId,
    ) -> Result<TxHash> {
        let provider = self.provider(chain_id)?;
        tx.chain_id = Some(chain_id);
        if tx.from.is_none() {
            tx.from = Some(self.address);
        }

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(classify_send_error)?;
        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, event = "transaction_submitted");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| TransferError::Wallet(e.to_string()))?;

        if !receipt.status() {
            return Err(TransferError::TransactionExecution {
                reason: format!("transaction {tx_hash} reverted"),
            });
        }

        info!(
            tx_hash = %tx_hash,
            chain_id = chain_id,
            event = "transaction_confirmed"
        );
        Ok(receipt.transaction_hash())
    }

    async fn call(&self, tx: TransactionRequest, chain_id: ChainId) -> Result<Bytes> {
        let provider = self.provider(chain_id)?;
        Ok(provider.call(tx).await?)
    }
}
