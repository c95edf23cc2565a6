//! Chain registry and the testnet addresses it is seeded with

pub mod addresses;
mod registry;

pub use registry::{
    ChainDescriptor, ChainId, ChainKind, ChainRegistry, NativeAddress, CODEX_TESTNET_CHAIN_ID,
    LINEA_SEPOLIA_CHAIN_ID, SOLANA_DEVNET_CHAIN_ID, SONIC_BLAZE_CHAIN_ID,
    UNICHAIN_SEPOLIA_CHAIN_ID, WORLDCHAIN_SEPOLIA_CHAIN_ID,
};
