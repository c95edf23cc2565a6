//! Static chain descriptors keyed by native chain id

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, B256};
use bon::Builder;
use solana_sdk::pubkey::Pubkey;

use super::addresses::*;
use crate::error::{Result, TransferError};
use crate::protocol::{DomainId, USDC_DECIMALS};

/// Native chain id (EIP-155 id for account chains, cluster id for Solana)
pub type ChainId = u64;

/// Solana devnet, as numbered by the wallet tooling this crate interoperates with
pub const SOLANA_DEVNET_CHAIN_ID: ChainId = 103;

pub const SONIC_BLAZE_CHAIN_ID: ChainId = 57054;
pub const LINEA_SEPOLIA_CHAIN_ID: ChainId = 59141;
pub const WORLDCHAIN_SEPOLIA_CHAIN_ID: ChainId = 4801;
pub const CODEX_TESTNET_CHAIN_ID: ChainId = 812242;
pub const UNICHAIN_SEPOLIA_CHAIN_ID: ChainId = 1301;

/// Execution model of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    /// Contract-based chain with 20-byte addresses (EVM)
    AccountChain,
    /// Program/account-model chain with 32-byte base58 addresses (Solana)
    ProgramChain,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountChain => f.write_str("account chain"),
            Self::ProgramChain => f.write_str("program chain"),
        }
    }
}

/// An address in the chain's own format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeAddress {
    Account(Address),
    Program(Pubkey),
}

impl NativeAddress {
    pub fn kind(&self) -> ChainKind {
        match self {
            Self::Account(_) => ChainKind::AccountChain,
            Self::Program(_) => ChainKind::ProgramChain,
        }
    }

    pub fn as_account(&self) -> Option<Address> {
        match self {
            Self::Account(address) => Some(*address),
            Self::Program(_) => None,
        }
    }

    pub fn as_program(&self) -> Option<Pubkey> {
        match self {
            Self::Program(pubkey) => Some(*pubkey),
            Self::Account(_) => None,
        }
    }

    /// The 32-byte form used in cross-chain messages
    pub fn to_bytes32(&self) -> B256 {
        match self {
            Self::Account(address) => address.into_word(),
            Self::Program(pubkey) => B256::from(pubkey.to_bytes()),
        }
    }
}

impl fmt::Display for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(address) => write!(f, "{address}"),
            Self::Program(pubkey) => write!(f, "{pubkey}"),
        }
    }
}

/// Everything the orchestrator needs to know about one chain
///
/// On a program chain `burn_contract` is the token-messenger-minter program and
/// `mint_contract` is the message-transmitter program.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ChainDescriptor {
    pub id: ChainId,
    #[builder(into)]
    pub name: String,
    pub kind: ChainKind,
    pub bridge_domain: DomainId,
    pub token: NativeAddress,
    pub burn_contract: NativeAddress,
    pub mint_contract: NativeAddress,
    #[builder(default = USDC_DECIMALS)]
    pub decimals: u8,
}

impl ChainDescriptor {
    pub fn is_program_chain(&self) -> bool {
        self.kind == ChainKind::ProgramChain
    }

    fn account(id: ChainId, name: &str, domain: DomainId, usdc: Address) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: ChainKind::AccountChain,
            bridge_domain: domain,
            token: NativeAddress::Account(usdc),
            burn_contract: NativeAddress::Account(CCTP_V2_TOKEN_MESSENGER_TESTNET),
            mint_contract: NativeAddress::Account(CCTP_V2_MESSAGE_TRANSMITTER_TESTNET),
            decimals: USDC_DECIMALS,
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, address) in [
            ("token", &self.token),
            ("burn_contract", &self.burn_contract),
            ("mint_contract", &self.mint_contract),
        ] {
            if address.kind() != self.kind {
                return Err(TransferError::InvalidConfig(format!(
                    "chain {} ({}): {field} is an {} address, expected {}",
                    self.name,
                    self.id,
                    address.kind(),
                    self.kind
                )));
            }
        }
        Ok(())
    }
}

/// Read-only lookup of chain descriptors
///
/// # Example
///
/// ```rust
/// use cctp_transfer::{ChainRegistry, DomainId};
///
/// let registry = ChainRegistry::testnet();
/// let base = registry.descriptor(84532).unwrap();
/// assert_eq!(base.bridge_domain, DomainId::Base);
/// assert!(registry.descriptor(1).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<ChainId, ChainDescriptor>,
}

impl ChainRegistry {
    /// Builds a registry, rejecting duplicate ids, duplicate bridge domains and
    /// addresses whose format does not match the chain kind
    pub fn new(descriptors: impl IntoIterator<Item = ChainDescriptor>) -> Result<Self> {
        let mut chains = BTreeMap::new();
        let mut domains: HashMap<DomainId, ChainId> = HashMap::new();

        for descriptor in descriptors {
            descriptor.validate()?;
            if let Some(other) = domains.insert(descriptor.bridge_domain, descriptor.id) {
                return Err(TransferError::InvalidConfig(format!(
                    "bridge domain {} is used by both chain {other} and chain {}",
                    descriptor.bridge_domain, descriptor.id
                )));
            }
            let id = descriptor.id;
            if chains.insert(id, descriptor).is_some() {
                return Err(TransferError::InvalidConfig(format!(
                    "chain {id} is listed more than once"
                )));
            }
        }

        Ok(Self { chains })
    }

    /// Looks up a chain, failing with `UnsupportedChain` for unknown ids
    pub fn descriptor(&self, id: ChainId) -> Result<&ChainDescriptor> {
        self.chains
            .get(&id)
            .ok_or_else(|| TransferError::unsupported_chain(id))
    }

    pub fn by_domain(&self, domain: DomainId) -> Option<&ChainDescriptor> {
        self.chains.values().find(|d| d.bridge_domain == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Circle's public testnet deployment: eleven EVM testnets and Solana devnet
    pub fn testnet() -> Self {
        let solana = ChainDescriptor {
            id: SOLANA_DEVNET_CHAIN_ID,
            name: "Solana Devnet".to_string(),
            kind: ChainKind::ProgramChain,
            bridge_domain: DomainId::Solana,
            token: NativeAddress::Program(SOLANA_DEVNET_USDC),
            burn_contract: NativeAddress::Program(SOLANA_TOKEN_MESSENGER_MINTER_V2),
            mint_contract: NativeAddress::Program(SOLANA_MESSAGE_TRANSMITTER_V2),
            decimals: USDC_DECIMALS,
        };

        let descriptors = [
            ChainDescriptor::account(
                NamedChain::Sepolia as u64,
                "Ethereum Sepolia",
                DomainId::Ethereum,
                ETHEREUM_SEPOLIA_USDC,
            ),
            ChainDescriptor::account(
                NamedChain::AvalancheFuji as u64,
                "Avalanche Fuji",
                DomainId::Avalanche,
                AVALANCHE_FUJI_USDC,
            ),
            ChainDescriptor::account(
                NamedChain::BaseSepolia as u64,
                "Base Sepolia",
                DomainId::Base,
                BASE_SEPOLIA_USDC,
            ),
            ChainDescriptor::account(
                SONIC_BLAZE_CHAIN_ID,
                "Sonic Blaze",
                DomainId::Sonic,
                SONIC_BLAZE_USDC,
            ),
            ChainDescriptor::account(
                LINEA_SEPOLIA_CHAIN_ID,
                "Linea Sepolia",
                DomainId::Linea,
                LINEA_SEPOLIA_USDC,
            ),
            ChainDescriptor::account(
                NamedChain::ArbitrumSepolia as u64,
                "Arbitrum Sepolia",
                DomainId::Arbitrum,
                ARBITRUM_SEPOLIA_USDC,
            ),
            ChainDescriptor::account(
                WORLDCHAIN_SEPOLIA_CHAIN_ID,
                "World Chain Sepolia",
                DomainId::WorldChain,
                WORLDCHAIN_SEPOLIA_USDC,
            ),
            ChainDescriptor::account(
                NamedChain::OptimismSepolia as u64,
                "Optimism Sepolia",
                DomainId::Optimism,
                OPTIMISM_SEPOLIA_USDC,
            ),
            solana,
            ChainDescriptor::account(
                CODEX_TESTNET_CHAIN_ID,
                "Codex Testnet",
                DomainId::Codex,
                CODEX_TESTNET_USDC,
            ),
            ChainDescriptor::account(
                UNICHAIN_SEPOLIA_CHAIN_ID,
                "Unichain Sepolia",
                DomainId::Unichain,
                UNICHAIN_SEPOLIA_USDC,
            ),
            ChainDescriptor::account(
                NamedChain::PolygonAmoy as u64,
                "Polygon Amoy",
                DomainId::Polygon,
                POLYGON_AMOY_USDC,
            ),
        ];

        Self {
            chains: descriptors.into_iter().map(|d| (d.id, d)).collect(),
        }
    }
}
