use std::fmt;

use chrono::{DateTime, Utc};

/// Step the current transfer is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Approving,
    Burning,
    WaitingAttestation,
    Minting,
    Completed,
    Failed,
}

impl TransferState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Approving => "approving",
            Self::Burning => "burning",
            Self::WaitingAttestation => "waiting-attestation",
            Self::Minting => "minting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed or Failed
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the human-readable progress log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_terminal_states() {
        assert!(TransferState::Completed.is_terminal());
        assert!(TransferState::Failed.is_terminal());
        assert!(!TransferState::Minting.is_terminal());
        assert_eq!(TransferState::default(), TransferState::Idle);
    }

    #[test]
    fn test_log_entry_display() {
        let entry = LogEntry {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 14, 5, 9).unwrap(),
            message: "Burning USDC...".to_string(),
        };
        insta::assert_snapshot!(entry.to_string(), @"[14:05:09] Burning USDC...");
    }
}
