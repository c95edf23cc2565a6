//! CCTP v2 message header
//!
//! Only the fields a destination chain needs to route a mint are decoded here.
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use alloy_primitives::FixedBytes;

use super::DomainId;

/// CCTP v2 message header
///
/// # Format
///
/// All integers are big-endian.
///
/// - version: uint32 (4 bytes)
/// - sourceDomain: uint32 (4 bytes)
/// - destinationDomain: uint32 (4 bytes)
/// - nonce: bytes32 (32 bytes)
/// - sender: bytes32 (32 bytes)
/// - recipient: bytes32 (32 bytes)
/// - destinationCaller: bytes32 (32 bytes)
/// - minFinalityThreshold: uint32 (4 bytes)
/// - finalityThresholdExecuted: uint32 (4 bytes)
///
/// Total fixed size: 148 bytes. The burn body follows and is not decoded.
///
/// Domains are kept as raw integers: the header is read on the destination
/// chain, which must not reject a message because it originates from a domain
/// this build does not list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub source_domain: u32,
    pub destination_domain: u32,
    /// Unique message nonce assigned by Circle
    pub nonce: FixedBytes<32>,
    pub sender: FixedBytes<32>,
    pub recipient: FixedBytes<32>,
    /// Address authorized to call receiveMessage on destination (0 = anyone)
    pub destination_caller: FixedBytes<32>,
    pub min_finality_threshold: u32,
    pub finality_threshold_executed: u32,
}

impl MessageHeader {
    pub const SIZE: usize = 148;

    pub const SOURCE_DOMAIN_OFFSET: usize = 4;
    pub const NONCE_OFFSET: usize = 12;

    /// Decodes the header from the start of `bytes`
    ///
    /// Returns `None` if fewer than [`MessageHeader::SIZE`] bytes are given.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        Some(Self {
            version: read_u32(bytes, 0)?,
            source_domain: read_u32(bytes, 4)?,
            destination_domain: read_u32(bytes, 8)?,
            nonce: FixedBytes::from_slice(&bytes[12..44]),
            sender: FixedBytes::from_slice(&bytes[44..76]),
            recipient: FixedBytes::from_slice(&bytes[76..108]),
            destination_caller: FixedBytes::from_slice(&bytes[108..140]),
            min_finality_threshold: read_u32(bytes, 140)?,
            finality_threshold_executed: read_u32(bytes, 144)?,
        })
    }

    /// Source domain as a known [`DomainId`], if it is one
    pub fn source_domain_id(&self) -> Option<DomainId> {
        DomainId::from_u32(self.source_domain)
    }

    /// Encodes the header back into its 148-byte wire form
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.to_be_bytes());
        bytes.extend_from_slice(self.nonce.as_slice());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.min_finality_threshold.to_be_bytes());
        bytes.extend_from_slice(&self.finality_threshold_executed.to_be_bytes());
        bytes
    }
}

/// Offset of `mintRecipient` inside the burn message body (after version and
/// burnToken)
const BURN_BODY_MINT_RECIPIENT_OFFSET: usize = 4 + 32;

/// Reads the mint recipient out of a full burn message (header plus body)
pub fn burn_mint_recipient(message: &[u8]) -> Option<FixedBytes<32>> {
    let start = MessageHeader::SIZE + BURN_BODY_MINT_RECIPIENT_OFFSET;
    message.get(start..start + 32).map(FixedBytes::from_slice)
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(raw))
}
