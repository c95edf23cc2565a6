//! Program-chain (Solana) adapter

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::B256;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use tracing::{debug, info, instrument};

use super::pda::{
    associated_token_address, deposit_for_burn_instruction, receive_message_instruction,
    DepositForBurnParams, DepositForBurnPdas, ReceiveMessageParams, ReceiveMessagePdas,
    TOKEN_ACCOUNT_AMOUNT_RANGE, TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET,
};
use super::{BurnParams, ChainAdapter, TxHandle};
use crate::chain::{ChainDescriptor, ChainRegistry, NativeAddress};
use crate::error::{Result, TransferError};
use crate::protocol::{burn_mint_recipient, format_units, AmountUnits, Attestation, MessageHeader};
use crate::spans;
use crate::traits::{ProgramChainReader, ProgramSigner};

/// Drives the TokenMessengerMinterV2 and MessageTransmitterV2 programs.
///
/// The descriptor's `burn_contract` is the token-messenger-minter program and
/// its `mint_contract` the message-transmitter program.
#[derive(Clone)]
pub struct ProgramChainAdapter {
    descriptor: ChainDescriptor,
    signer: Arc<dyn ProgramSigner>,
    reader: Arc<dyn ProgramChainReader>,
    /// Source domain → USDC of that domain as bytes32, for the token pair seed
    remote_tokens: HashMap<u32, B256>,
    mint: Pubkey,
    token_messenger_minter: Pubkey,
    message_transmitter: Pubkey,
}

impl ProgramChainAdapter {
    /// Builds the adapter for a program-chain descriptor, learning the remote
    /// token of every account chain in `registry`
    pub fn new(
        descriptor: ChainDescriptor,
        signer: Arc<dyn ProgramSigner>,
        reader: Arc<dyn ProgramChainReader>,
        registry: &ChainRegistry,
    ) -> Result<Self> {
        let program = |address: &NativeAddress, field: &str| {
            address.as_program().ok_or_else(|| {
                TransferError::InvalidConfig(format!(
                    "{}: {field} must be a program chain address",
                    descriptor.name
                ))
            })
        };
        let mint = program(&descriptor.token, "token")?;
        let token_messenger_minter = program(&descriptor.burn_contract, "burn_contract")?;
        let message_transmitter = program(&descriptor.mint_contract, "mint_contract")?;

        let remote_tokens = registry
            .iter()
            .filter(|d| !d.is_program_chain())
            .map(|d| (d.bridge_domain.as_u32(), d.token.to_bytes32()))
            .collect();

        Ok(Self {
            descriptor,
            signer,
            reader,
            remote_tokens,
            mint,
            token_messenger_minter,
            message_transmitter,
        })
    }

    /// The owner's associated token account for the USDC mint
    pub fn token_account(&self, owner: &Pubkey) -> Pubkey {
        associated_token_address(owner, &self.mint)
    }

    async fn fee_recipient(&self, token_messenger: &Pubkey) -> Result<Pubkey> {
        let data = self
            .reader
            .account_data(token_messenger)
            .await?
            .ok_or_else(|| {
                TransferError::Provider(format!("TokenMessenger account {token_messenger} not found"))
            })?;

        let start = TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET;
        data.get(start..start + 32)
            .and_then(|raw| Pubkey::try_from(raw).ok())
            .ok_or_else(|| {
                TransferError::Provider(format!(
                    "TokenMessenger account {token_messenger} is too short ({} bytes)",
                    data.len()
                ))
            })
    }
}

impl std::fmt::Debug for ProgramChainAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramChainAdapter")
            .field("chain", &self.descriptor.name)
            .field("payer", &self.signer.pubkey())
            .field("mint", &self.mint)
            .finish()
    }
}

#[async_trait]
impl ChainAdapter for ProgramChainAdapter {
    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    fn owner(&self) -> Option<NativeAddress> {
        Some(NativeAddress::Program(self.signer.pubkey()))
    }

    #[instrument(skip(self), fields(chain_id = self.descriptor.id))]
    async fn balance(&self, owner: &NativeAddress) -> Result<String> {
        let owner = owner.as_program().ok_or_else(|| {
            TransferError::invalid_address(owner.to_string(), "expected a program chain address")
        })?;
        let account = self.token_account(&owner);

        let Some(data) = self.reader.account_data(&account).await? else {
            debug!(token_account = %account, event = "token_account_missing");
            return Ok("0".to_string());
        };

        let raw: [u8; 8] = data
            .get(TOKEN_ACCOUNT_AMOUNT_RANGE)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                TransferError::Provider(format!("token account {account} is too short"))
            })?;
        Ok(format_units(u64::from_le_bytes(raw), self.descriptor.decimals))
    }

    async fn approve(&self, _spender: &NativeAddress, _amount: AmountUnits) -> Result<TxHandle> {
        debug!(chain_id = self.descriptor.id, event = "approval_not_required");
        Ok(TxHandle::Skipped)
    }

    async fn burn(&self, params: &BurnParams) -> Result<TxHandle> {
        let owner = self.signer.pubkey();
        let event_account = Keypair::new();

        let instruction = {
            let span = spans::program_deposit_for_burn(
                &owner.to_string(),
                params.destination_domain.as_u32(),
                params.amount.get(),
            );
            let _guard = span.enter();

            let pdas = DepositForBurnPdas::derive(
                &self.message_transmitter,
                &self.token_messenger_minter,
                &self.mint,
                &owner,
                params.destination_domain.as_u32(),
            );
            let args = DepositForBurnParams {
                amount: params.amount.get(),
                destination_domain: params.destination_domain.as_u32(),
                mint_recipient: params.mint_recipient.0,
                destination_caller: params.destination_caller.0,
                max_fee: params.max_fee,
                min_finality_threshold: params.finality.as_u32(),
            };
            info!(
                mint_recipient = %params.mint_recipient,
                max_fee = params.max_fee,
                finality_threshold = params.finality.as_u32(),
                message_sent_event_data = %event_account.pubkey(),
                event = "program_deposit_for_burn_created"
            );

            deposit_for_burn_instruction(
                &self.message_transmitter,
                &self.token_messenger_minter,
                &pdas,
                &owner,
                &self.token_account(&owner),
                &self.mint,
                &event_account.pubkey(),
                &args,
            )
            .map_err(|e| TransferError::Provider(format!("failed to encode deposit_for_burn: {e}")))?
        };

        let signature = self
            .signer
            .send_instructions(vec![instruction], vec![event_account])
            .await?;
        Ok(TxHandle::Program(signature))
    }

    async fn mint(&self, attestation: &Attestation) -> Result<TxHandle> {
        let payer = self.signer.pubkey();
        let header = MessageHeader::decode(&attestation.message).ok_or_else(|| {
            TransferError::Provider(format!(
                "attestation message is {} bytes, shorter than a message header",
                attestation.message.len()
            ))
        })?;
        let remote_token = self.remote_tokens.get(&header.source_domain).ok_or_else(|| {
            TransferError::unsupported_chain(format!("domain {}", header.source_domain))
        })?;

        let pdas = ReceiveMessagePdas::derive(
            &self.message_transmitter,
            &self.token_messenger_minter,
            &self.mint,
            header.source_domain,
            remote_token,
            &header.nonce,
        );
        let fee_recipient = self.fee_recipient(&pdas.common.token_messenger).await?;
        let user_token_account = burn_mint_recipient(&attestation.message)
            .map(|word| Pubkey::new_from_array(word.0))
            .unwrap_or_else(|| self.token_account(&payer));

        debug!(
            source_domain = header.source_domain,
            nonce = %header.nonce,
            fee_recipient = %fee_recipient,
            user_token_account = %user_token_account,
            event = "receive_message_accounts_derived"
        );

        let instruction = receive_message_instruction(
            &self.message_transmitter,
            &self.token_messenger_minter,
            &pdas,
            &payer,
            &self.token_account(&fee_recipient),
            &user_token_account,
            &ReceiveMessageParams {
                message: attestation.message.to_vec(),
                attestation: attestation.attestation.to_vec(),
            },
        )
        .map_err(|e| TransferError::Provider(format!("failed to encode receive_message: {e}")))?;

        let signature = self.signer.send_instructions(vec![instruction], Vec::new()).await?;
        Ok(TxHandle::Program(signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::pda::{anchor_discriminator, RECEIVE_MESSAGE_NAMED_ACCOUNTS};
    use crate::chain::addresses::{ETHEREUM_SEPOLIA_USDC, SOLANA_TOKEN_MESSENGER_MINTER_V2};
    use crate::chain::SOLANA_DEVNET_CHAIN_ID;
    use crate::error::ErrorKind;
    use crate::protocol::{AttestationStatus, DomainId, FinalityThreshold};
    use crate::testing::{burn_message, FakeChainReader, FakeProgramSigner};

    fn adapter(signer: &FakeProgramSigner, reader: &FakeChainReader) -> ProgramChainAdapter {
        let registry = ChainRegistry::testnet();
        let descriptor = registry.descriptor(SOLANA_DEVNET_CHAIN_ID).unwrap().clone();
        ProgramChainAdapter::new(
            descriptor,
            Arc::new(signer.clone()),
            Arc::new(reader.clone()),
            &registry,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_account_reads_zero() {
        let signer = FakeProgramSigner::new();
        let adapter = adapter(&signer, &FakeChainReader::new());
        let balance = adapter
            .balance(&NativeAddress::Program(Pubkey::new_unique()))
            .await
            .unwrap();
        assert_eq!(balance, "0");
    }

    #[tokio::test]
    async fn test_balance_from_token_account() {
        let signer = FakeProgramSigner::new();
        let reader = FakeChainReader::new();
        let adapter = adapter(&signer, &reader);
        let owner = Pubkey::new_unique();

        let mut data = vec![0u8; 165];
        data[64..72].copy_from_slice(&2_500_000u64.to_le_bytes());
        reader.insert(adapter.token_account(&owner), data);

        let balance = adapter.balance(&NativeAddress::Program(owner)).await.unwrap();
        assert_eq!(balance, "2.5");
    }

    #[tokio::test]
    async fn test_approve_is_skipped() {
        let signer = FakeProgramSigner::new();
        let adapter = adapter(&signer, &FakeChainReader::new());
        let handle = adapter
            .approve(
                &NativeAddress::Program(SOLANA_TOKEN_MESSENGER_MINTER_V2),
                AmountUnits::new(1),
            )
            .await
            .unwrap();
        assert_eq!(handle, TxHandle::Skipped);
        assert!(signer.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_burn_submits_deposit_for_burn_with_event_signer() {
        let signer = FakeProgramSigner::new();
        let adapter = adapter(&signer, &FakeChainReader::new());
        let params = BurnParams {
            amount: AmountUnits::new(5_000_000),
            destination_domain: DomainId::Base,
            mint_recipient: B256::repeat_byte(0x11),
            destination_caller: B256::repeat_byte(0x22),
            max_fee: 4_999_999,
            finality: FinalityThreshold::Standard,
        };

        let handle = adapter.burn(&params).await.unwrap();
        assert!(matches!(handle, TxHandle::Program(_)));

        let submissions = signer.submissions();
        assert_eq!(submissions.len(), 1);
        let (instructions, extra_signers) = &submissions[0];
        assert_eq!(extra_signers.len(), 1);

        let ix = &instructions[0];
        assert_eq!(ix.program_id, SOLANA_TOKEN_MESSENGER_MINTER_V2);
        assert_eq!(ix.data[..8], anchor_discriminator("deposit_for_burn"));
        assert_eq!(ix.accounts[0].pubkey, signer.pubkey());
        assert_eq!(ix.accounts[11].pubkey, extra_signers[0]);
        // destination caller follows the mint recipient
        assert_eq!(&ix.data[20..52], &[0x11; 32]);
        assert_eq!(&ix.data[52..84], &[0x22; 32]);
    }

    #[tokio::test]
    async fn test_mint_reads_fee_recipient_and_routes_to_recipient() {
        let signer = FakeProgramSigner::new();
        let reader = FakeChainReader::new();
        let adapter = adapter(&signer, &reader);

        let recipient_account = Pubkey::new_unique();
        let message = burn_message(
            DomainId::Ethereum,
            DomainId::Solana,
            B256::repeat_byte(0x42),
            B256::from(recipient_account.to_bytes()),
        );
        let nonce = MessageHeader::decode(&message).unwrap().nonce;
        let remote = ETHEREUM_SEPOLIA_USDC.into_word();
        let pdas = ReceiveMessagePdas::derive(
            &adapter.message_transmitter,
            &adapter.token_messenger_minter,
            &adapter.mint,
            0,
            &remote,
            &nonce,
        );

        let fee_recipient = Pubkey::new_unique();
        let mut token_messenger = vec![0u8; 200];
        token_messenger[TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET..TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET + 32]
            .copy_from_slice(fee_recipient.as_ref());
        reader.insert(pdas.common.token_messenger, token_messenger);

        adapter
            .mint(&Attestation {
                message: message.clone(),
                attestation: vec![9u8; 65].into(),
                status: AttestationStatus::Complete,
            })
            .await
            .unwrap();

        let (instructions, extra_signers) = signer.submissions().remove(0);
        assert!(extra_signers.is_empty());
        let ix = &instructions[0];
        assert_eq!(ix.data[..8], anchor_discriminator("receive_message"));
        assert_eq!(ix.accounts[4].pubkey, pdas.used_nonce);

        let remaining = &ix.accounts[RECEIVE_MESSAGE_NAMED_ACCOUNTS..];
        assert_eq!(remaining[4].pubkey, pdas.token_pair);
        assert_eq!(remaining[5].pubkey, adapter.token_account(&fee_recipient));
        assert_eq!(remaining[6].pubkey, recipient_account);
    }

    #[tokio::test]
    async fn test_mint_without_token_messenger_account_fails() {
        let signer = FakeProgramSigner::new();
        let adapter = adapter(&signer, &FakeChainReader::new());
        let message = burn_message(
            DomainId::Base,
            DomainId::Solana,
            B256::repeat_byte(1),
            B256::repeat_byte(2),
        );

        let err = adapter
            .mint(&Attestation {
                message,
                attestation: vec![0u8; 65].into(),
                status: AttestationStatus::Complete,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert!(signer.submissions().is_empty());
    }
}
