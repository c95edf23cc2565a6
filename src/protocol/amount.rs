//! Decimal token amounts and their base-unit representation

use std::fmt;

use crate::error::{Result, TransferError};

/// Decimals of USDC on every supported chain
pub const USDC_DECIMALS: u8 = 6;

/// An amount expressed in the token's smallest unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountUnits(u64);

impl AmountUnits {
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parses a user-entered decimal string such as `"10"` or `"1.5"`
    ///
    /// Rejects empty input, signs, exponents, more fractional digits than
    /// `decimals`, overflow and zero.
    ///
    /// ```rust
    /// use cctp_transfer::AmountUnits;
    ///
    /// assert_eq!(AmountUnits::parse("1.5", 6).unwrap().get(), 1_500_000);
    /// assert!(AmountUnits::parse("0.0000001", 6).is_err());
    /// ```
    pub fn parse(input: &str, decimals: u8) -> Result<Self> {
        let invalid = |reason: &str| TransferError::InvalidAmount {
            amount: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("amount is empty"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("amount must be a non-negative decimal number"));
        }
        if fraction.len() > usize::from(decimals) {
            return Err(invalid("too many decimal places"));
        }

        let scale = 10u64
            .checked_pow(u32::from(decimals))
            .ok_or_else(|| invalid("unsupported decimals"))?;
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| invalid("amount is too large"))?
        };
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{fraction:0<width$}", width = usize::from(decimals));
            padded
                .parse::<u64>()
                .map_err(|_| invalid("amount is too large"))?
        };

        let units = whole_units
            .checked_mul(scale)
            .and_then(|w| w.checked_add(fraction_units))
            .ok_or_else(|| invalid("amount is too large"))?;

        if units == 0 {
            return Err(invalid("amount must be greater than zero"));
        }
        Ok(Self(units))
    }

    /// Maximum fee the burn will allow: the full amount minus one base unit
    ///
    /// Fails for a zero amount instead of wrapping.
    pub fn max_fee(self) -> Result<u64> {
        self.0
            .checked_sub(1)
            .ok_or_else(|| TransferError::InvalidAmount {
                amount: "0".to_string(),
                reason: "amount must be greater than zero".to_string(),
            })
    }

    /// Formats the amount back into a decimal string, trimming trailing zeros
    pub fn format(self, decimals: u8) -> String {
        format_units(self.0, decimals)
    }
}

impl fmt::Display for AmountUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Formats a base-unit integer as a decimal string
pub fn format_units(units: u64, decimals: u8) -> String {
    let Some(scale) = 10u64.checked_pow(u32::from(decimals)) else {
        return units.to_string();
    };
    let whole = units / scale;
    let fraction = units % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0>width$}", width = usize::from(decimals));
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
