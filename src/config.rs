//! Polling, retry and environment configuration

use std::time::Duration;

use crate::error::{Result, TransferError};
use crate::providers::{
    parse_program_keypair, IrisAttestationProvider, KeypairProgramSigner, SolanaRpcReader,
    IRIS_SANDBOX_URL, SOLANA_DEVNET_RPC_URL,
};

/// Configuration for attestation polling behavior.
///
/// # Examples
///
/// ```rust
/// use cctp_transfer::PollingConfig;
///
/// // Poll every 5 seconds until the attestation is ready
/// let config = PollingConfig::default();
/// assert_eq!(config.max_attempts, None);
///
/// // Give up after 60 polls, 10 seconds apart
/// let config = PollingConfig::default()
///     .with_max_attempts(60)
///     .with_poll_interval_secs(10);
/// assert_eq!(config.total_timeout_secs(), Some(600));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Polls before giving up; `None` polls until cancelled.
    pub max_attempts: Option<u32>,
    /// Seconds to wait between polls.
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    /// Unbounded polling every 5 seconds.
    fn default() -> Self {
        Self {
            max_attempts: None,
            poll_interval_secs: 5,
        }
    }
}

impl PollingConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// `max_attempts * poll_interval_secs`, when bounded
    pub fn total_timeout_secs(&self) -> Option<u64> {
        self.max_attempts
            .map(|attempts| u64::from(attempts) * self.poll_interval_secs)
    }
}

/// In-place retry of the mint step after transient execution failures.
///
/// After failed attempt `n` (1-based) the orchestrator waits `n * delay_unit`
/// and tries again, up to `max_attempts` submissions in total.
///
/// ```rust
/// use std::time::Duration;
/// use cctp_transfer::MintRetryPolicy;
///
/// let policy = MintRetryPolicy::default();
/// assert_eq!(policy.max_attempts, 5);
/// assert_eq!(policy.delay_for(3), Duration::from_secs(6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintRetryPolicy {
    /// Mint submissions in total, the first one included
    pub max_attempts: u32,
    pub delay_unit: Duration,
}

impl Default for MintRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_unit: Duration::from_secs(2),
        }
    }
}

impl MintRetryPolicy {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_delay_unit(mut self, unit: Duration) -> Self {
        self.delay_unit = unit;
        self
    }

    /// Delay after failed attempt `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_unit.saturating_mul(attempt)
    }
}

/// Orchestrator timing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub polling: PollingConfig,
    pub mint_retry: MintRetryPolicy,
    /// Wait after asking the wallet to switch chains
    pub settle_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            polling: PollingConfig::default(),
            mint_retry: MintRetryPolicy::default(),
            settle_delay: Duration::from_secs(5),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_mint_retry(mut self, mint_retry: MintRetryPolicy) -> Self {
        self.mint_retry = mint_retry;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

pub const IRIS_API_URL_VAR: &str = "IRIS_API_URL";
pub const SOLANA_RPC_URL_VAR: &str = "SOLANA_RPC_URL";
pub const SOLANA_PRIVATE_KEY_VAR: &str = "SOLANA_PRIVATE_KEY";

/// Endpoints and credentials read from the environment
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub iris_api_url: String,
    pub solana_rpc_url: String,
    pub solana_private_key: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("iris_api_url", &self.iris_api_url)
            .field("solana_rpc_url", &self.solana_rpc_url)
            .field(
                "solana_private_key",
                &self.solana_private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// Unset URLs fall back to Circle's sandbox and Solana devnet.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), event = "dotenv_loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            iris_api_url: non_empty(IRIS_API_URL_VAR).unwrap_or_else(|| IRIS_SANDBOX_URL.to_string()),
            solana_rpc_url: non_empty(SOLANA_RPC_URL_VAR)
                .unwrap_or_else(|| SOLANA_DEVNET_RPC_URL.to_string()),
            solana_private_key: non_empty(SOLANA_PRIVATE_KEY_VAR),
        }
    }

    pub fn attestation_provider(&self) -> IrisAttestationProvider {
        IrisAttestationProvider::new(self.iris_api_url.clone())
    }

    pub fn solana_reader(&self) -> SolanaRpcReader {
        SolanaRpcReader::new(self.solana_rpc_url.clone())
    }

    /// The program-chain signer, failing with `InvalidConfig` if no key is set
    pub fn solana_signer(&self) -> Result<KeypairProgramSigner> {
        let secret = self.solana_private_key.as_deref().ok_or_else(|| {
            TransferError::InvalidConfig(format!("{SOLANA_PRIVATE_KEY_VAR} is not set"))
        })?;
        Ok(KeypairProgramSigner::new(
            parse_program_keypair(secret)?,
            self.solana_rpc_url.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.polling.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.polling.total_timeout_secs(), None);
        assert_eq!(config.mint_retry.max_attempts, 5);
        assert_eq!(config.settle_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_mint_retry_delays_grow_linearly() {
        let policy = MintRetryPolicy::default();
        let delays: Vec<u64> = (1..=5).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.iris_api_url, IRIS_SANDBOX_URL);
        assert_eq!(settings.solana_rpc_url, SOLANA_DEVNET_RPC_URL);
        assert!(settings.solana_private_key.is_none());
        assert_eq!(
            settings.solana_signer().unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn test_settings_overrides_and_redaction() {
        let env: HashMap<&str, &str> = HashMap::from([
            (IRIS_API_URL_VAR, "https://iris.example"),
            (SOLANA_RPC_URL_VAR, " "),
            (SOLANA_PRIVATE_KEY_VAR, "secret"),
        ]);
        let settings = Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.iris_api_url, "https://iris.example");
        assert_eq!(settings.solana_rpc_url, SOLANA_DEVNET_RPC_URL);
        assert!(!format!("{settings:?}").contains("secret"));
        assert_eq!(
            settings.solana_signer().unwrap_err().kind(),
            ErrorKind::SolanaKeyFormatInvalid
        );
    }
}
