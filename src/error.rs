// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Chain not supported: {chain}")]
    UnsupportedChain { chain: String },

    #[error("Invalid address format for {address:?}: {reason}")]
    InvalidAddressFormat { address: String, reason: String },

    #[error("Invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("Approval failed: {reason}")]
    ApprovalFailed { reason: String },

    #[error("Burn failed: {reason}")]
    BurnFailed { reason: String },

    #[error("Attestation retrieval failed: {reason}")]
    AttestationTransportFailed { reason: String },

    #[error("Mint failed (will retry): {reason}")]
    MintRetryable { reason: String },

    #[error("Mint failed after {attempts} attempt(s): {reason}")]
    MintFailed { attempts: u32, reason: String },

    #[error("Invalid Solana private key format. Expected base58 encoded key or 32-byte hex string")]
    SolanaKeyFormatInvalid,

    #[error("Transaction execution failed: {reason}")]
    TransactionExecution { reason: String },

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("A transfer is already in progress")]
    TransferInProgress,

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

impl TransferError {
    /// Returns the classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WalletNotConnected => ErrorKind::WalletNotConnected,
            Self::UnsupportedChain { .. } => ErrorKind::UnsupportedChain,
            Self::InvalidAddressFormat { .. } => ErrorKind::InvalidAddressFormat,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::ApprovalFailed { .. } => ErrorKind::ApprovalFailed,
            Self::BurnFailed { .. } => ErrorKind::BurnFailed,
            Self::AttestationTransportFailed { .. } | Self::Network(_) => {
                ErrorKind::AttestationTransportFailed
            }
            Self::MintRetryable { .. } => ErrorKind::MintRetryable,
            Self::MintFailed { .. } => ErrorKind::MintFailed,
            Self::SolanaKeyFormatInvalid => ErrorKind::SolanaKeyFormatInvalid,
            Self::TransactionExecution { .. } => ErrorKind::TransactionExecution,
            Self::Wallet(_) => ErrorKind::Wallet,
            Self::Provider(_) | Self::Rpc(_) => ErrorKind::Provider,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::TransferInProgress => ErrorKind::TransferInProgress,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Abi(_) | Self::Json(_) | Self::Hex(_) => ErrorKind::Encoding,
        }
    }

    /// True for the transient "transaction execution" failures a wallet
    /// reports while the destination chain is still catching up.
    pub fn is_transient_execution(&self) -> bool {
        matches!(
            self,
            Self::TransactionExecution { .. } | Self::MintRetryable { .. }
        )
    }

    pub(crate) fn unsupported_chain(chain: impl fmt::Display) -> Self {
        Self::UnsupportedChain {
            chain: chain.to_string(),
        }
    }

    pub(crate) fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddressFormat {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

/// Coarse classification of a [`TransferError`], retained by the orchestrator
/// after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WalletNotConnected,
    UnsupportedChain,
    InvalidAddressFormat,
    InvalidAmount,
    ApprovalFailed,
    BurnFailed,
    AttestationTransportFailed,
    MintRetryable,
    MintFailed,
    SolanaKeyFormatInvalid,
    TransactionExecution,
    Wallet,
    Provider,
    InvalidConfig,
    TransferInProgress,
    Cancelled,
    Encoding,
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let transient = TransferError::TransactionExecution {
            reason: "nonce too low".to_string(),
        };
        assert!(transient.is_transient_execution());
        assert_eq!(transient.kind(), ErrorKind::TransactionExecution);

        let fatal = TransferError::Wallet("user rejected".to_string());
        assert!(!fatal.is_transient_execution());
        assert_eq!(fatal.kind(), ErrorKind::Wallet);
    }

    #[test]
    fn test_display_messages() {
        let err = TransferError::MintFailed {
            attempts: 5,
            reason: "execution reverted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mint failed after 5 attempt(s): execution reverted"
        );
        assert_eq!(
            TransferError::unsupported_chain(999u64).to_string(),
            "Chain not supported: 999"
        );
    }
}
