//! Finality thresholds and the transfer modes that select them
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use std::fmt;
use std::str::FromStr;

/// Minimum finality the attestation service waits for before signing a burn
///
/// ```rust
/// use cctp_transfer::{FinalityThreshold, TransferMode};
///
/// assert_eq!(FinalityThreshold::from(TransferMode::Fast).as_u32(), 1000);
/// assert_eq!(FinalityThreshold::from(TransferMode::Standard).as_u32(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FinalityThreshold {
    /// Attested at the "confirmed" level, lower latency and higher risk
    Fast = 1000,
    /// Attested at the "finalized" level
    #[default]
    Standard = 2000,
}

impl FinalityThreshold {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1000 => Some(Self::Fast),
            2000 => Some(Self::Standard),
            _ => None,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fast => "Fast Transfer",
            Self::Standard => "Standard Transfer",
        }
    }
}

impl From<FinalityThreshold> for u32 {
    #[inline]
    fn from(threshold: FinalityThreshold) -> Self {
        threshold.as_u32()
    }
}

impl fmt::Display for FinalityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// How fast the caller wants the transfer to settle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferMode {
    #[default]
    Fast,
    Standard,
}

impl TransferMode {
    pub const fn finality_threshold(self) -> FinalityThreshold {
        match self {
            Self::Fast => FinalityThreshold::Fast,
            Self::Standard => FinalityThreshold::Standard,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
        }
    }
}

impl From<TransferMode> for FinalityThreshold {
    fn from(mode: TransferMode) -> Self {
        mode.finality_threshold()
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "standard" => Ok(Self::Standard),
            other => Err(format!(
                "unknown transfer mode {other:?} (expected \"fast\" or \"standard\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_values() {
        assert_eq!(FinalityThreshold::Fast.as_u32(), 1000);
        assert_eq!(FinalityThreshold::Standard.as_u32(), 2000);
        assert_eq!(FinalityThreshold::from_u32(1500), None);
    }

    #[test]
    fn test_mode_selects_threshold() {
        assert_eq!(
            TransferMode::Fast.finality_threshold(),
            FinalityThreshold::Fast
        );
        assert_eq!(
            TransferMode::Standard.finality_threshold(),
            FinalityThreshold::Standard
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("fast".parse::<TransferMode>(), Ok(TransferMode::Fast));
        assert_eq!(
            " Standard ".parse::<TransferMode>(),
            Ok(TransferMode::Standard)
        );
        assert!("instant".parse::<TransferMode>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(FinalityThreshold::Fast.to_string(), "Fast Transfer (1000)");
        assert_eq!(TransferMode::Standard.to_string(), "standard");
    }
}
