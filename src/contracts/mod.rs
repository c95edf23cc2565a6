//! Calldata builders for the account-chain CCTP v2 contracts
//!
//! The bindings are generated inline with `sol!` and only encode and decode;
//! signing and submission belong to the [`WalletSession`](crate::WalletSession).

mod erc20;
mod message_transmitter;
mod token_messenger;

pub use erc20::{Erc20Contract, IERC20};
pub use message_transmitter::{IMessageTransmitterV2, MessageTransmitterV2Contract};
pub use token_messenger::{DepositForBurnArgs, ITokenMessengerV2, TokenMessengerV2Contract};
