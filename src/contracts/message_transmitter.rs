//! MessageTransmitterV2 `receiveMessage`

use alloy_primitives::{Address, Bytes};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{sol, SolCall};
use tracing::info;

sol! {
    #[allow(missing_docs)]
    interface IMessageTransmitterV2 {
        function receiveMessage(bytes message, bytes attestation) external returns (bool success);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MessageTransmitterV2Contract {
    address: Address,
}

impl MessageTransmitterV2Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Builds an unsigned `receiveMessage` transaction that mints on this chain
    pub fn receive_message_transaction(
        &self,
        message: Bytes,
        attestation: Bytes,
        from_address: Address,
    ) -> TransactionRequest {
        info!(
            message_len = message.len(),
            attestation_len = attestation.len(),
            from_address = %from_address,
            contract_address = %self.address,
            version = "v2",
            event = "receive_message_v2_transaction_created"
        );

        let calldata = IMessageTransmitterV2::receiveMessageCall {
            message,
            attestation,
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
