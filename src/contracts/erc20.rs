// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! ERC20 calls needed before a burn: balance and approval

use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{sol, SolCall};
use tracing::{debug, info};

use crate::error::Result;

sol! {
    #[allow(missing_docs)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// ERC20 token at a fixed address
///
/// # Example
///
/// ```rust
/// use alloy_primitives::{address, U256};
/// use cctp_transfer::contracts::Erc20Contract;
///
/// let usdc = Erc20Contract::new(address!("036CbD53842c5426634e7929541eC2318f3dCF7e"));
/// let owner = address!("1234567890123456789012345678901234567890");
/// let spender = address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");
///
/// let tx = usdc.approve_transaction(owner, spender, U256::from(10_000_000u64));
/// assert_eq!(tx.from, Some(owner));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Erc20Contract {
    address: Address,
}

impl Erc20Contract {
    pub fn new(address: Address) -> Self {
        debug!(
            contract_address = %address,
            event = "erc20_contract_initialized"
        );
        Self { address }
    }

    /// Builds an unsigned `approve(spender, amount)` transaction
    pub fn approve_transaction(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            spender = %spender,
            amount = %amount,
            contract_address = %self.address,
            event = "approve_transaction_created"
        );

        let calldata = IERC20::approveCall { spender, amount }.abi_encode();
        TransactionRequest::default()
            .from(from)
            .to(self.address)
            .input(TransactionInput::new(calldata.into()))
    }

    /// Builds a read-only `balanceOf(account)` call
    pub fn balance_of_call(&self, account: Address) -> TransactionRequest {
        debug!(
            account = %account,
            contract_address = %self.address,
            event = "checking_balance"
        );

        let calldata = IERC20::balanceOfCall { account }.abi_encode();
        TransactionRequest::default()
            .to(self.address)
            .input(TransactionInput::new(calldata.into()))
    }

    /// Decodes the return data of [`balance_of_call`](Self::balance_of_call)
    pub fn decode_balance(&self, data: &Bytes) -> Result<U256> {
        let balance = IERC20::balanceOfCall::abi_decode_returns(data)?;
        debug!(
            balance = %balance,
            contract_address = %self.address,
            event = "balance_retrieved"
        );
        Ok(balance)
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolValue;

    const USDC: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");

    #[test]
    fn test_approve_calldata() {
        let contract = Erc20Contract::new(USDC);
        let spender = address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");
        let tx = contract.approve_transaction(Address::ZERO, spender, U256::from(42u64));

        let input = tx.input.input().cloned().unwrap();
        assert_eq!(&input[..4], IERC20::approveCall::SELECTOR.as_slice());
        let decoded = IERC20::approveCall::abi_decode(&input).unwrap();
        assert_eq!(decoded.spender, spender);
        assert_eq!(decoded.amount, U256::from(42u64));
    }

    #[test]
    fn test_decode_balance() {
        let contract = Erc20Contract::new(USDC);
        let encoded = Bytes::from(U256::from(1_500_000u64).abi_encode());
        assert_eq!(
            contract.decode_balance(&encoded).unwrap(),
            U256::from(1_500_000u64)
        );
        assert!(contract.decode_balance(&Bytes::from_static(&[1, 2])).is_err());
    }
}
