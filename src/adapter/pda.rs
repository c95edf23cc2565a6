//! Program-derived addresses and Anchor instruction encoding for the CCTP v2
//! Solana programs

use alloy_primitives::B256;
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::chain::addresses::{ASSOCIATED_TOKEN_PROGRAM, SPL_TOKEN_PROGRAM};

/// Byte offset of `fee_recipient` inside the TokenMessenger account:
/// discriminator, denylister, owner, pending_owner, message_body_version,
/// authority_bump.
pub const TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET: usize = 8 + 32 + 32 + 32 + 4 + 1;

/// Byte range of `amount` inside an SPL token account
pub const TOKEN_ACCOUNT_AMOUNT_RANGE: std::ops::Range<usize> = 64..72;

/// First eight bytes of `sha256("global:<name>")`
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn find(seeds: &[&[u8]], program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(seeds, program).0
}

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    find(
        &[owner.as_ref(), SPL_TOKEN_PROGRAM.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM,
    )
}

pub fn event_authority(program: &Pubkey) -> Pubkey {
    find(&[b"__event_authority"], program)
}

/// Accounts shared by burn and mint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonPdas {
    pub message_transmitter: Pubkey,
    pub token_messenger: Pubkey,
    pub token_minter: Pubkey,
    pub local_token: Pubkey,
    pub remote_token_messenger: Pubkey,
    pub token_messenger_event_authority: Pubkey,
}

impl CommonPdas {
    /// `remote_domain` is the destination domain on burn and the source domain
    /// on mint
    pub fn derive(
        message_transmitter_program: &Pubkey,
        token_messenger_minter_program: &Pubkey,
        mint: &Pubkey,
        remote_domain: u32,
    ) -> Self {
        let tmm = token_messenger_minter_program;
        let domain = remote_domain.to_string();
        Self {
            message_transmitter: find(&[b"message_transmitter"], message_transmitter_program),
            token_messenger: find(&[b"token_messenger"], tmm),
            token_minter: find(&[b"token_minter"], tmm),
            local_token: find(&[b"local_token", mint.as_ref()], tmm),
            remote_token_messenger: find(&[b"remote_token_messenger", domain.as_bytes()], tmm),
            token_messenger_event_authority: event_authority(tmm),
        }
    }
}

/// Accounts of `deposit_for_burn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositForBurnPdas {
    pub common: CommonPdas,
    pub sender_authority: Pubkey,
    pub denylist: Pubkey,
}

impl DepositForBurnPdas {
    pub fn derive(
        message_transmitter_program: &Pubkey,
        token_messenger_minter_program: &Pubkey,
        mint: &Pubkey,
        owner: &Pubkey,
        destination_domain: u32,
    ) -> Self {
        let tmm = token_messenger_minter_program;
        Self {
            common: CommonPdas::derive(message_transmitter_program, tmm, mint, destination_domain),
            sender_authority: find(&[b"sender_authority"], tmm),
            denylist: find(&[b"denylist_account", owner.as_ref()], tmm),
        }
    }
}

/// Accounts of `receive_message`, minus the fee recipient's token account,
/// which needs the on-chain TokenMessenger state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveMessagePdas {
    pub common: CommonPdas,
    pub authority: Pubkey,
    pub used_nonce: Pubkey,
    pub token_pair: Pubkey,
    pub custody: Pubkey,
    pub message_transmitter_event_authority: Pubkey,
}

impl ReceiveMessagePdas {
    pub fn derive(
        message_transmitter_program: &Pubkey,
        token_messenger_minter_program: &Pubkey,
        mint: &Pubkey,
        source_domain: u32,
        remote_token: &B256,
        nonce: &B256,
    ) -> Self {
        let mt = message_transmitter_program;
        let tmm = token_messenger_minter_program;
        let domain = source_domain.to_string();
        Self {
            common: CommonPdas::derive(mt, tmm, mint, source_domain),
            authority: find(&[b"message_transmitter_authority", tmm.as_ref()], mt),
            used_nonce: find(&[b"used_nonce", nonce.as_slice()], mt),
            token_pair: find(
                &[b"token_pair", domain.as_bytes(), remote_token.as_slice()],
                tmm,
            ),
            custody: find(&[b"custody", mint.as_ref()], tmm),
            message_transmitter_event_authority: event_authority(mt),
        }
    }
}

/// Borsh layout of `DepositForBurnParams`; pubkeys travel as raw bytes
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct DepositForBurnParams {
    pub amount: u64,
    pub destination_domain: u32,
    pub mint_recipient: [u8; 32],
    pub destination_caller: [u8; 32],
    pub max_fee: u64,
    pub min_finality_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct ReceiveMessageParams {
    pub message: Vec<u8>,
    pub attestation: Vec<u8>,
}

fn anchor_data<T: BorshSerialize>(name: &str, params: &T) -> std::io::Result<Vec<u8>> {
    let mut data = anchor_discriminator(name).to_vec();
    params.serialize(&mut data)?;
    Ok(data)
}

/// Builds the `deposit_for_burn` instruction of the TokenMessengerMinterV2
/// program
#[allow(clippy::too_many_arguments)]
pub fn deposit_for_burn_instruction(
    message_transmitter_program: &Pubkey,
    token_messenger_minter_program: &Pubkey,
    pdas: &DepositForBurnPdas,
    owner: &Pubkey,
    burn_token_account: &Pubkey,
    mint: &Pubkey,
    message_sent_event_data: &Pubkey,
    params: &DepositForBurnParams,
) -> std::io::Result<Instruction> {
    let tmm = *token_messenger_minter_program;
    let accounts = vec![
        AccountMeta::new_readonly(*owner, true),
        AccountMeta::new(*owner, true),
        AccountMeta::new_readonly(pdas.sender_authority, false),
        AccountMeta::new(*burn_token_account, false),
        AccountMeta::new_readonly(pdas.denylist, false),
        AccountMeta::new(pdas.common.message_transmitter, false),
        AccountMeta::new_readonly(pdas.common.token_messenger, false),
        AccountMeta::new_readonly(pdas.common.remote_token_messenger, false),
        AccountMeta::new_readonly(pdas.common.token_minter, false),
        AccountMeta::new(pdas.common.local_token, false),
        AccountMeta::new(*mint, false),
        AccountMeta::new(*message_sent_event_data, true),
        AccountMeta::new_readonly(*message_transmitter_program, false),
        AccountMeta::new_readonly(tmm, false),
        AccountMeta::new_readonly(SPL_TOKEN_PROGRAM, false),
        AccountMeta::new_readonly(solana_sdk::system_program::id(), false),
        AccountMeta::new_readonly(pdas.common.token_messenger_event_authority, false),
        AccountMeta::new_readonly(tmm, false),
    ];

    Ok(Instruction {
        program_id: tmm,
        accounts,
        data: anchor_data("deposit_for_burn", params)?,
    })
}

/// Builds the `receive_message` instruction of the MessageTransmitterV2
/// program, with the TokenMessengerMinter accounts appended as remaining
/// accounts in the order the receiver expects
#[allow(clippy::too_many_arguments)]
pub fn receive_message_instruction(
    message_transmitter_program: &Pubkey,
    token_messenger_minter_program: &Pubkey,
    pdas: &ReceiveMessagePdas,
    payer: &Pubkey,
    fee_recipient_token_account: &Pubkey,
    user_token_account: &Pubkey,
    params: &ReceiveMessageParams,
) -> std::io::Result<Instruction> {
    let mt = *message_transmitter_program;
    let tmm = *token_messenger_minter_program;
    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(*payer, true),
        AccountMeta::new_readonly(pdas.authority, false),
        AccountMeta::new_readonly(pdas.common.message_transmitter, false),
        AccountMeta::new(pdas.used_nonce, false),
        AccountMeta::new_readonly(tmm, false),
        AccountMeta::new_readonly(solana_sdk::system_program::id(), false),
        AccountMeta::new_readonly(pdas.message_transmitter_event_authority, false),
        AccountMeta::new_readonly(mt, false),
        // remaining accounts
        AccountMeta::new_readonly(pdas.common.token_messenger, false),
        AccountMeta::new_readonly(pdas.common.remote_token_messenger, false),
        AccountMeta::new(pdas.common.token_minter, false),
        AccountMeta::new(pdas.common.local_token, false),
        AccountMeta::new_readonly(pdas.token_pair, false),
        AccountMeta::new(*fee_recipient_token_account, false),
        AccountMeta::new(*user_token_account, false),
        AccountMeta::new(pdas.custody, false),
        AccountMeta::new_readonly(SPL_TOKEN_PROGRAM, false),
        AccountMeta::new_readonly(pdas.common.token_messenger_event_authority, false),
        AccountMeta::new_readonly(tmm, false),
    ];

    Ok(Instruction {
        program_id: mt,
        accounts,
        data: anchor_data("receive_message", params)?,
    })
}

/// Number of fixed (named) accounts ahead of the remaining accounts in
/// [`receive_message_instruction`]
pub const RECEIVE_MESSAGE_NAMED_ACCOUNTS: usize = 9;
