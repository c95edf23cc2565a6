//! Production implementations of the collaborator traits.
//!
//! These talk to real account-chain RPC endpoints, the Solana JSON-RPC API,
//! Circle's Iris API and the system clock. Test code substitutes the fakes in
//! [`testing`](crate::testing).

mod alloy;
mod iris;
mod solana;
mod tokio_clock;

pub use self::alloy::AlloyWalletSession;
pub use self::iris::{IrisAttestationProvider, IRIS_PRODUCTION_URL, IRIS_SANDBOX_URL};
pub use self::solana::{
    parse_program_keypair, KeypairProgramSigner, SolanaRpcReader, SOLANA_DEVNET_RPC_URL,
};
pub use self::tokio_clock::TokioClock;
