//! CCTP bridge domain identifiers
//!
//! The bridging protocol addresses chains by a small integer "domain" that is
//! unrelated to the chain's native id. Attestation lookups, burn instructions and
//! program-derived addresses on Solana are all keyed by it.
//!
//! Reference: <https://developers.circle.com/cctp/supported-domains>

use std::fmt;

use serde::{Deserialize, Serialize};

/// CCTP domain identifier
///
/// # Example
///
/// ```rust
/// use cctp_transfer::DomainId;
///
/// assert_eq!(DomainId::Base.as_u32(), 6);
/// assert_eq!(DomainId::from_u32(5), Some(DomainId::Solana));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    Ethereum = 0,
    Avalanche = 1,
    Optimism = 2,
    Arbitrum = 3,
    /// The only program-model domain this crate bridges to
    Solana = 5,
    Base = 6,
    Polygon = 7,
    Unichain = 10,
    Linea = 11,
    Codex = 12,
    Sonic = 13,
    WorldChain = 14,
    Sei = 16,
}

const ALL: [(DomainId, &str); 13] = [
    (DomainId::Ethereum, "Ethereum"),
    (DomainId::Avalanche, "Avalanche"),
    (DomainId::Optimism, "Optimism"),
    (DomainId::Arbitrum, "Arbitrum"),
    (DomainId::Solana, "Solana"),
    (DomainId::Base, "Base"),
    (DomainId::Polygon, "Polygon"),
    (DomainId::Unichain, "Unichain"),
    (DomainId::Linea, "Linea"),
    (DomainId::Codex, "Codex"),
    (DomainId::Sonic, "Sonic"),
    (DomainId::WorldChain, "World Chain"),
    (DomainId::Sei, "Sei"),
];

impl DomainId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Looks up a domain by its numeric value
    pub fn from_u32(value: u32) -> Option<Self> {
        ALL.iter()
            .find(|(domain, _)| domain.as_u32() == value)
            .map(|(domain, _)| *domain)
    }

    /// Reads a big-endian domain from the first four bytes of `bytes`, as it
    /// appears inside CCTP message headers
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Self::from_u32(u32::from_be_bytes(raw))
    }

    pub fn name(self) -> &'static str {
        ALL.iter()
            .find(|(domain, _)| *domain == self)
            .map(|(_, name)| *name)
            .unwrap_or("Unknown")
    }

    /// Every domain this crate knows about
    pub fn all() -> impl Iterator<Item = DomainId> {
        ALL.iter().map(|(domain, _)| *domain)
    }

    /// Domain seed used by the Solana programs: the decimal string of the value
    pub fn seed(self) -> String {
        self.as_u32().to_string()
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = InvalidDomainId;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidDomainId(value))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Error returned for a numeric domain outside the supported set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDomainId(pub u32);

impl fmt::Display for InvalidDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CCTP domain ID: {}", self.0)
    }
}

impl std::error::Error for InvalidDomainId {}
