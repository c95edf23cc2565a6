//! Translation between native address formats and the 32-byte form carried in
//! cross-chain messages

use alloy_primitives::{hex, Address, B256};
use solana_sdk::pubkey::Pubkey;

use crate::chain::{ChainKind, NativeAddress};
use crate::error::{Result, TransferError};

/// Left-pads a 20-byte account address to 32 bytes
///
/// ```rust
/// use alloy_primitives::address;
/// use cctp_transfer::address::{pad_to_bytes32, unpad_from_bytes32};
///
/// let addr = address!("742d35cc6634c0532925a3b844bc9e7595f8fa0d");
/// assert_eq!(unpad_from_bytes32(pad_to_bytes32(addr)).unwrap(), addr);
/// ```
pub fn pad_to_bytes32(address: Address) -> B256 {
    address.into_word()
}

/// Recovers a 20-byte account address from its padded form
///
/// Fails if any of the 12 high-order bytes is non-zero, since such a value
/// was never a padded account address.
pub fn unpad_from_bytes32(word: B256) -> Result<Address> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(TransferError::invalid_address(
            word.to_string(),
            "high-order 12 bytes are not zero",
        ));
    }
    Ok(Address::from_word(word))
}

/// Parses a hex account address, with or without `0x`
///
/// Input of the wrong length is rejected rather than padded or truncated.
pub fn parse_account_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() % 2 != 0 {
        return Err(TransferError::invalid_address(input, "odd number of hex digits"));
    }
    let bytes = hex::decode(digits).map_err(|e| TransferError::invalid_address(input, e.to_string()))?;
    if bytes.len() != Address::len_bytes() {
        return Err(TransferError::invalid_address(
            input,
            format!("expected 20 bytes, got {}", bytes.len()),
        ));
    }
    Ok(Address::from_slice(&bytes))
}

/// Parses a base58 program-chain address
pub fn parse_program_address(input: &str) -> Result<Pubkey> {
    let trimmed = input.trim();
    let bytes = bs58::decode(trimmed)
        .into_vec()
        .map_err(|e| TransferError::invalid_address(input, e.to_string()))?;
    let array: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        TransferError::invalid_address(input, format!("expected 32 bytes, got {}", bytes.len()))
    })?;
    Ok(Pubkey::new_from_array(array))
}

/// Decodes a base58 program-chain address into its 32 raw bytes
pub fn program_address_to_bytes32(input: &str) -> Result<B256> {
    parse_program_address(input).map(|pubkey| B256::from(pubkey.to_bytes()))
}

/// Parses exactly 32 bytes of hex, with or without `0x`
pub fn bytes32_from_hex(input: &str) -> Result<B256> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| TransferError::invalid_address(input, e.to_string()))?;
    if bytes.len() != 32 {
        return Err(TransferError::invalid_address(
            input,
            format!("expected 32 bytes, got {}", bytes.len()),
        ));
    }
    Ok(B256::from_slice(&bytes))
}

/// Parses an address in the format native to `kind`
pub fn parse_native_address(input: &str, kind: ChainKind) -> Result<NativeAddress> {
    match kind {
        ChainKind::AccountChain => parse_account_address(input).map(NativeAddress::Account),
        ChainKind::ProgramChain => parse_program_address(input).map(NativeAddress::Program),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alloy_primitives::address;
    use rstest::rstest;

    #[test]
    fn test_pad_roundtrip() {
        let addr = address!("742d35cc6634c0532925a3b844bc9e7595f8fa0d");
        let padded = pad_to_bytes32(addr);
        assert_eq!(&padded[..12], &[0u8; 12]);
        assert_eq!(&padded[12..], addr.as_slice());
        assert_eq!(unpad_from_bytes32(padded).unwrap(), addr);
    }

    #[test]
    fn test_unpad_rejects_dirty_high_bytes() {
        let mut word = [0u8; 32];
        word[0] = 1;
        let err = unpad_from_bytes32(B256::from(word)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddressFormat);
    }

    #[rstest]
    #[case("0x742d35Cc6634C0532925a3b844Bc9e7595f8fA0d")]
    #[case("742d35cc6634c0532925a3b844bc9e7595f8fa0d")]
    fn test_parse_account_address(#[case] input: &str) {
        assert_eq!(
            parse_account_address(input).unwrap(),
            address!("742d35cc6634c0532925a3b844bc9e7595f8fa0d")
        );
    }

    #[rstest]
    #[case("0x742d35cc6634c0532925a3b844bc9e7595f8fa0")]
    #[case("0x742d35cc6634c0532925a3b844bc9e7595f8fa")]
    #[case("0x742d35cc6634c0532925a3b844bc9e7595f8fa0d00")]
    #[case("0xzz2d35cc6634c0532925a3b844bc9e7595f8fa0d")]
    #[case("")]
    fn test_parse_account_address_rejects(#[case] input: &str) {
        let err = parse_account_address(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddressFormat);
    }

    #[test]
    fn test_program_address_to_bytes32() {
        let bytes = program_address_to_bytes32("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU").unwrap();
        assert_eq!(
            bytes.as_slice(),
            crate::chain::addresses::SOLANA_DEVNET_USDC.to_bytes().as_slice()
        );
    }

    #[rstest]
    #[case("0OIl")]
    #[case("3yZe7d")]
    fn test_program_address_rejects(#[case] input: &str) {
        let err = program_address_to_bytes32(input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddressFormat);
    }

    #[test]
    fn test_bytes32_from_hex() {
        let hex_str = format!("0x{}", "ab".repeat(32));
        assert_eq!(bytes32_from_hex(&hex_str).unwrap(), B256::from([0xab; 32]));
        assert!(bytes32_from_hex("0xabcd").is_err());
    }

    #[test]
    fn test_parse_native_address_follows_kind() {
        let account = parse_native_address(
            "0x742d35cc6634c0532925a3b844bc9e7595f8fa0d",
            ChainKind::AccountChain,
        )
        .unwrap();
        assert_eq!(account.kind(), ChainKind::AccountChain);

        assert!(parse_native_address(
            "0x742d35cc6634c0532925a3b844bc9e7595f8fa0d",
            ChainKind::ProgramChain
        )
        .is_err());
    }
}
