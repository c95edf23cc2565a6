// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Testnet contract, program and token addresses
//!
//! Reference: <https://developers.circle.com/cctp/evm-smart-contracts>,
//! <https://developers.circle.com/cctp/solana-programs>,
//! <https://developers.circle.com/stablecoins/usdc-contract-addresses>

use alloy_primitives::{address, Address};
use solana_sdk::pubkey::Pubkey;

// =============================================================================
// CCTP V2 EVM contracts
// =============================================================================
//
// V2 deploys to the same address on every testnet chain.

/// CCTP V2 TokenMessenger address (Testnet)
pub const CCTP_V2_TOKEN_MESSENGER_TESTNET: Address =
    address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");

/// CCTP V2 MessageTransmitter address (Testnet)
pub const CCTP_V2_MESSAGE_TRANSMITTER_TESTNET: Address =
    address!("E737e5cEBEEBa77EFE34D4aa090756590b1CE275");

// =============================================================================
// CCTP V2 Solana programs
// =============================================================================

/// TokenMessengerMinterV2 program (devnet)
pub const SOLANA_TOKEN_MESSENGER_MINTER_V2: Pubkey =
    solana_sdk::pubkey!("CCTPV2vPZJS2u2BBsUoscuikbYjnpFmbFsvVuJdgUMQe");

/// MessageTransmitterV2 program (devnet)
pub const SOLANA_MESSAGE_TRANSMITTER_V2: Pubkey =
    solana_sdk::pubkey!("CCTPV2Sm4AdWt5296sk4P66VBZ7bEhcARwFaaS9YPbeC");

/// SPL Token program
pub const SPL_TOKEN_PROGRAM: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// SPL Associated Token Account program
pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

// =============================================================================
// USDC
// =============================================================================

/// <https://sepolia.etherscan.io/address/0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238>
pub const ETHEREUM_SEPOLIA_USDC: Address = address!("1c7d4b196cb0c7b01d743fbc6116a902379c7238");

/// <https://testnet.snowtrace.io/address/0x5425890298aed601595a70AB815c96711a31Bc65>
pub const AVALANCHE_FUJI_USDC: Address = address!("5425890298aed601595a70AB815c96711a31Bc65");

/// <https://sepolia.basescan.org/address/0x036CbD53842c5426634e7929541eC2318f3dCF7e>
pub const BASE_SEPOLIA_USDC: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");

pub const SONIC_BLAZE_USDC: Address = address!("A4879Fed32Ecbef99399e5cbC247E533421C4eC6");

pub const LINEA_SEPOLIA_USDC: Address = address!("FEce4462D57bD51A6A552365A011b95f0E16d9B7");

/// <https://sepolia.arbiscan.io/address/0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d>
pub const ARBITRUM_SEPOLIA_USDC: Address = address!("75faf114eafb1BDbe2F0316DF893fd58CE46AA4d");

pub const WORLDCHAIN_SEPOLIA_USDC: Address =
    address!("66145f38cBAC35Ca6F1Dfb4914dF98F1614aeA88");

/// <https://sepolia-optimism.etherscan.io/address/0x5fd84259d66Cd46123540766Be93DFE6D43130D7>
pub const OPTIMISM_SEPOLIA_USDC: Address = address!("5fd84259d66Cd46123540766Be93DFE6D43130D7");

pub const CODEX_TESTNET_USDC: Address = address!("6d7f141b6819C2c9CC2f818e6ad549E7Ca090F8f");

pub const UNICHAIN_SEPOLIA_USDC: Address = address!("31d0220469e10c4E71834a79b1f276d740d3768F");

/// <https://amoy.polygonscan.com/address/0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582>
pub const POLYGON_AMOY_USDC: Address = address!("41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582");

/// Devnet USDC mint
pub const SOLANA_DEVNET_USDC: Pubkey =
    solana_sdk::pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");
