// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Account-chain (EVM) adapter

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{BurnParams, ChainAdapter, TxHandle};
use crate::chain::{ChainDescriptor, NativeAddress};
use crate::contracts::{
    DepositForBurnArgs, Erc20Contract, MessageTransmitterV2Contract, TokenMessengerV2Contract,
};
use crate::error::{Result, TransferError};
use crate::protocol::{format_units, AmountUnits, Attestation};
use crate::traits::WalletSession;

/// Drives the USDC, TokenMessengerV2 and MessageTransmitterV2 contracts of one
/// account chain through a shared [`WalletSession`].
///
/// Every transaction is sent with the descriptor's chain id bound explicitly,
/// whatever chain the wallet currently reports as active.
#[derive(Clone)]
pub struct AccountChainAdapter {
    descriptor: ChainDescriptor,
    wallet: Arc<dyn WalletSession>,
}

impl AccountChainAdapter {
    /// Fails with `InvalidConfig` for a program-chain descriptor
    pub fn new(descriptor: ChainDescriptor, wallet: Arc<dyn WalletSession>) -> Result<Self> {
        if descriptor.is_program_chain() {
            return Err(TransferError::InvalidConfig(format!(
                "{} is a program chain",
                descriptor.name
            )));
        }
        Ok(Self { descriptor, wallet })
    }

    fn sender(&self) -> Result<Address> {
        self.wallet.address().ok_or(TransferError::WalletNotConnected)
    }

    fn contract_address(&self, address: &NativeAddress) -> Result<Address> {
        address.as_account().ok_or_else(|| {
            TransferError::invalid_address(address.to_string(), "expected an account chain address")
        })
    }

    fn token(&self) -> Result<Erc20Contract> {
        Ok(Erc20Contract::new(self.contract_address(&self.descriptor.token)?))
    }
}

impl std::fmt::Debug for AccountChainAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountChainAdapter")
            .field("chain", &self.descriptor.name)
            .field("chain_id", &self.descriptor.id)
            .finish()
    }
}

#[async_trait]
impl ChainAdapter for AccountChainAdapter {
    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    fn owner(&self) -> Option<NativeAddress> {
        self.wallet.address().map(NativeAddress::Account)
    }

    #[instrument(skip(self), fields(chain_id = self.descriptor.id))]
    async fn balance(&self, owner: &NativeAddress) -> Result<String> {
        let account = self.contract_address(owner)?;
        let token = self.token()?;
        let data = self
            .wallet
            .call(token.balance_of_call(account), self.descriptor.id)
            .await?;
        let raw = token.decode_balance(&data)?;
        let units = u64::try_from(raw).map_err(|_| {
            TransferError::Provider(format!("balance {raw} does not fit in 64 bits"))
        })?;
        Ok(format_units(units, self.descriptor.decimals))
    }

    #[instrument(skip(self), fields(chain_id = self.descriptor.id))]
    async fn approve(&self, spender: &NativeAddress, amount: AmountUnits) -> Result<TxHandle> {
        let from = self.sender()?;
        let spender = self.contract_address(spender)?;
        let tx = self
            .token()?
            .approve_transaction(from, spender, U256::from(amount.get()));
        let hash = self.wallet.send_transaction(tx, self.descriptor.id).await?;
        debug!(tx_hash = %hash, event = "approval_confirmed");
        Ok(TxHandle::Account(hash))
    }

    async fn burn(&self, params: &BurnParams) -> Result<TxHandle> {
        let from = self.sender()?;
        let messenger =
            TokenMessengerV2Contract::new(self.contract_address(&self.descriptor.burn_contract)?);
        let args = DepositForBurnArgs {
            amount: U256::from(params.amount.get()),
            destination_domain: params.destination_domain.as_u32(),
            mint_recipient: params.mint_recipient,
            burn_token: self.contract_address(&self.descriptor.token)?,
            destination_caller: params.destination_caller,
            max_fee: U256::from(params.max_fee),
            min_finality_threshold: params.finality.as_u32(),
        };

        let tx = messenger.deposit_for_burn_transaction(from, &args);
        let hash = self.wallet.send_transaction(tx, self.descriptor.id).await?;
        info!(
            tx_hash = %hash,
            chain_id = self.descriptor.id,
            event = "burn_confirmed"
        );
        Ok(TxHandle::Account(hash))
    }

    async fn mint(&self, attestation: &Attestation) -> Result<TxHandle> {
        let from = self.sender()?;
        let transmitter =
            MessageTransmitterV2Contract::new(self.contract_address(&self.descriptor.mint_contract)?);
        let tx = transmitter.receive_message_transaction(
            attestation.message.clone(),
            attestation.attestation.clone(),
            from,
        );
        let hash = self.wallet.send_transaction(tx, self.descriptor.id).await?;
        info!(
            tx_hash = %hash,
            chain_id = self.descriptor.id,
            event = "mint_confirmed"
        );
        Ok(TxHandle::Account(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::addresses::CCTP_V2_MESSAGE_TRANSMITTER_TESTNET;
    use crate::chain::ChainRegistry;
    use crate::error::ErrorKind;
    use crate::protocol::{AttestationStatus, DomainId, FinalityThreshold};
    use crate::testing::FakeWalletSession;
    use alloy_primitives::{Bytes, B256};
    use alloy_sol_types::SolCall;

    fn base_sepolia(wallet: &FakeWalletSession) -> AccountChainAdapter {
        let descriptor = ChainRegistry::testnet().descriptor(84532).unwrap().clone();
        AccountChainAdapter::new(descriptor, Arc::new(wallet.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_balance_is_formatted_with_decimals() {
        let wallet = FakeWalletSession::connected(Address::repeat_byte(1), 84532);
        wallet.set_balance(U256::from(12_345_000u64));
        let adapter = base_sepolia(&wallet);

        let balance = adapter
            .balance(&NativeAddress::Account(Address::repeat_byte(1)))
            .await
            .unwrap();
        assert_eq!(balance, "12.345");
    }

    #[tokio::test]
    async fn test_burn_is_bound_to_descriptor_chain() {
        // wallet still on Sepolia; the burn must target Base Sepolia regardless
        let wallet = FakeWalletSession::connected(Address::repeat_byte(1), 11155111);
        let adapter = base_sepolia(&wallet);
        let params = BurnParams {
            amount: AmountUnits::new(10_000_000),
            destination_domain: DomainId::Ethereum,
            mint_recipient: Address::repeat_byte(2).into_word(),
            destination_caller: B256::ZERO,
            max_fee: 9_999_999,
            finality: FinalityThreshold::Fast,
        };

        let handle = adapter.burn(&params).await.unwrap();
        assert!(matches!(handle, TxHandle::Account(_)));

        let sent = wallet.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 84532);
    }

    #[tokio::test]
    async fn test_mint_encodes_receive_message() {
        let wallet = FakeWalletSession::connected(Address::repeat_byte(1), 84532);
        let adapter = base_sepolia(&wallet);
        let attestation = Attestation {
            message: Bytes::from(vec![1u8; 148]),
            attestation: Bytes::from(vec![2u8; 65]),
            status: AttestationStatus::Complete,
        };

        adapter.mint(&attestation).await.unwrap();

        let (_, tx) = wallet.sent_transactions().remove(0);
        assert_eq!(tx.to, Some(CCTP_V2_MESSAGE_TRANSMITTER_TESTNET.into()));
        let input = tx.input.input().cloned().unwrap();
        let decoded =
            crate::contracts::IMessageTransmitterV2::receiveMessageCall::abi_decode(&input)
                .unwrap();
        assert_eq!(decoded.attestation.len(), 65);
    }

    #[tokio::test]
    async fn test_disconnected_wallet() {
        let wallet = FakeWalletSession::disconnected(84532);
        let adapter = base_sepolia(&wallet);
        let err = adapter
            .approve(
                &NativeAddress::Account(Address::ZERO),
                AmountUnits::new(1),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WalletNotConnected);
    }

    #[test]
    fn test_program_descriptor_rejected() {
        let wallet = FakeWalletSession::disconnected(103);
        let descriptor = ChainRegistry::testnet().descriptor(103).unwrap().clone();
        let err = AccountChainAdapter::new(descriptor, Arc::new(wallet)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
