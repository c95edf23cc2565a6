//! Protocol-level types shared by every chain family

mod amount;
mod attestation;
mod domain_id;
mod finality;
mod message;

pub use amount::{format_units, AmountUnits, USDC_DECIMALS};
pub use attestation::{Attestation, AttestationStatus, V2AttestationResponse, V2Message};
pub use domain_id::{DomainId, InvalidDomainId};
pub use finality::{FinalityThreshold, TransferMode};
pub use message::{burn_mint_recipient, MessageHeader};
