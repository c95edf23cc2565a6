//! Solana program-chain reader and signer.

use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, instrument};

use crate::error::{Result, TransferError};
use crate::traits::{ProgramChainReader, ProgramSigner};

pub const SOLANA_DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

fn rpc_client(rpc_url: String) -> RpcClient {
    RpcClient::new_with_timeout_and_commitment(rpc_url, RPC_TIMEOUT, CommitmentConfig::confirmed())
}

// ============================================================================
// READER
// ============================================================================

/// Reads account data at `confirmed` commitment.
pub struct SolanaRpcReader {
    rpc_client: RpcClient,
}

impl SolanaRpcReader {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_client: rpc_client(rpc_url.into()),
        }
    }

    pub fn devnet() -> Self {
        Self::new(SOLANA_DEVNET_RPC_URL)
    }
}

impl std::fmt::Debug for SolanaRpcReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpcReader")
            .field("rpc_url", &self.rpc_client.url())
            .finish()
    }
}

#[async_trait]
impl ProgramChainReader for SolanaRpcReader {
    #[instrument(skip(self), fields(pubkey = %pubkey))]
    async fn account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(pubkey, self.rpc_client.commitment())
            .await
            .map_err(|e| read_error("getAccountInfo", e))?;

        let Some(account) = response.value else {
            debug!(event = "account_not_found");
            return Ok(None);
        };
        debug!(len = account.data.len(), event = "account_data_retrieved");
        Ok(Some(account.data))
    }
}

// ============================================================================
// SIGNER
// ============================================================================

/// Parses a program-chain secret key.
///
/// Accepts a base58 64-byte secret key, a base58 32-byte seed, or a 64-digit
/// hex seed with an optional `0x` prefix.
pub fn parse_program_keypair(input: &str) -> Result<Keypair> {
    let trimmed = input.trim();

    let hex_digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_digits.len() == 64 && hex_digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        let seed = alloy_primitives::hex::decode(hex_digits)
            .map_err(|_| TransferError::SolanaKeyFormatInvalid)?;
        return keypair_from_seed(&seed).map_err(|_| TransferError::SolanaKeyFormatInvalid);
    }

    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|_| TransferError::SolanaKeyFormatInvalid)?;
    match bytes.len() {
        64 => Keypair::try_from(bytes.as_slice()).map_err(|_| TransferError::SolanaKeyFormatInvalid),
        32 => keypair_from_seed(&bytes).map_err(|_| TransferError::SolanaKeyFormatInvalid),
        _ => Err(TransferError::SolanaKeyFormatInvalid),
    }
}

/// Signs with a local keypair and submits through the nonblocking RPC client.
pub struct KeypairProgramSigner {
    keypair: Keypair,
    rpc_client: RpcClient,
}

impl KeypairProgramSigner {
    pub fn new(keypair: Keypair, rpc_url: impl Into<String>) -> Self {
        Self {
            keypair,
            rpc_client: rpc_client(rpc_url.into()),
        }
    }

    /// Builds a signer from a secret key string, see [`parse_program_keypair`]
    pub fn from_secret(secret: &str, rpc_url: impl Into<String>) -> Result<Self> {
        Ok(Self::new(parse_program_keypair(secret)?, rpc_url))
    }
}

impl std::fmt::Debug for KeypairProgramSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairProgramSigner")
            .field("pubkey", &self.keypair.pubkey())
            .field("rpc_url", &self.rpc_client.url())
            .finish()
    }
}

/// Reads never execute anything, so every failure is a provider failure.
fn read_error(method: &str, err: ClientError) -> TransferError {
    TransferError::Provider(format!("{method} failed: {err}"))
}

/// Simulation and on-chain failures are the transient class.
fn classify_client_error(err: ClientError) -> TransferError {
    match err.kind() {
        ClientErrorKind::TransactionError(_) | ClientErrorKind::RpcError(_) => {
            TransferError::TransactionExecution {
                reason: err.to_string(),
            }
        }
        _ => TransferError::Wallet(err.to_string()),
    }
}

#[async_trait]
impl ProgramSigner for KeypairProgramSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    #[instrument(skip_all, fields(instructions = instructions.len(), signers = extra_signers.len() + 1))]
    async fn send_instructions(
        &self,
        instructions: Vec<Instruction>,
        extra_signers: Vec<Keypair>,
    ) -> Result<Signature> {
        let blockhash = self
            .rpc_client
            .get_latest_blockhash()
            .await
            .map_err(|e| read_error("getLatestBlockhash", e))?;

        let payer = self.keypair.pubkey();
        let tx = {
            let mut signers: Vec<&dyn Signer> = vec![&self.keypair];
            signers.extend(extra_signers.iter().map(|k| k as &dyn Signer));
            Transaction::new_signed_with_payer(
                &instructions,
                Some(&payer),
                signers.as_slice(),
                blockhash,
            )
        };

        let signature = self
            .rpc_client
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(classify_client_error)?;

        info!(signature = %signature, event = "program_transaction_confirmed");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_base58_secret_key() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let parsed = parse_program_keypair(&encoded).unwrap();
        assert_eq!(parsed.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_parse_base58_seed() {
        let seed = [7u8; 32];
        let encoded = bs58::encode(seed).into_string();
        let parsed = parse_program_keypair(&encoded).unwrap();
        assert_eq!(parsed.pubkey(), keypair_from_seed(&seed).unwrap().pubkey());
    }

    #[test]
    fn test_parse_hex_seed() {
        let seed = [9u8; 32];
        let hex_seed = alloy_primitives::hex::encode(seed);
        let expected = keypair_from_seed(&seed).unwrap().pubkey();

        assert_eq!(parse_program_keypair(&hex_seed).unwrap().pubkey(), expected);
        assert_eq!(
            parse_program_keypair(&format!("0x{hex_seed}")).unwrap().pubkey(),
            expected
        );
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        for input in ["", "not-a-key!", "0x1234", &bs58::encode([1u8; 16]).into_string()] {
            let err = parse_program_keypair(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::SolanaKeyFormatInvalid);
        }
    }
}
