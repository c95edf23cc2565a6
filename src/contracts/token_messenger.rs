//! TokenMessengerV2 `depositForBurn`

use alloy_primitives::{Address, B256, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{sol, SolCall};
use tracing::info;

use crate::spans;

sol! {
    #[allow(missing_docs)]
    interface ITokenMessengerV2 {
        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold
        ) external;
    }
}

/// Arguments of a v2 `depositForBurn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositForBurnArgs {
    pub amount: U256,
    pub destination_domain: u32,
    pub mint_recipient: B256,
    pub burn_token: Address,
    /// Only this caller may submit the mint; zero lets anyone relay it
    pub destination_caller: B256,
    pub max_fee: U256,
    pub min_finality_threshold: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenMessengerV2Contract {
    address: Address,
}

impl TokenMessengerV2Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Builds an unsigned `depositForBurn` transaction
    pub fn deposit_for_burn_transaction(
        &self,
        from_address: Address,
        args: &DepositForBurnArgs,
    ) -> TransactionRequest {
        let span = spans::deposit_for_burn(
            &from_address.to_string(),
            &args.mint_recipient,
            args.destination_domain,
            &args.amount,
        );
        let _guard = span.enter();

        info!(
            from_address = %from_address,
            mint_recipient = %args.mint_recipient,
            destination_domain = args.destination_domain,
            token_address = %args.burn_token,
            amount = %args.amount,
            max_fee = %args.max_fee,
            finality_threshold = args.min_finality_threshold,
            contract_address = %self.address,
            version = "v2",
            event = "deposit_for_burn_v2_transaction_created"
        );

        let calldata = ITokenMessengerV2::depositForBurnCall {
            amount: args.amount,
            destinationDomain: args.destination_domain,
            mintRecipient: args.mint_recipient,
            burnToken: args.burn_token,
            destinationCaller: args.destination_caller,
            maxFee: args.max_fee,
            minFinalityThreshold: args.min_finality_threshold,
        }
        .abi_encode();

        TransactionRequest::default()
            .from(from_address)
            .to(self.address)
            .input(TransactionInput::new(calldata.into()))
    }

    pub fn address(&self) -> Address {
        self.address
    }
}
