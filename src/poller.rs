//! Attestation polling against the Iris API

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

use crate::config::PollingConfig;
use crate::error::{Result, TransferError};
use crate::protocol::{Attestation, AttestationStatus, DomainId};
use crate::spans;
use crate::traits::{AttestationProvider, Clock};

/// Polls Iris for the attestation of one burn.
///
/// Not-yet-indexed (404) and non-complete responses keep polling; any other
/// transport failure ends the poll. Cancellation is observed during every
/// request and every sleep.
#[derive(Clone)]
pub struct AttestationPoller {
    provider: Arc<dyn AttestationProvider>,
    clock: Arc<dyn Clock>,
    config: PollingConfig,
}

impl AttestationPoller {
    pub fn new(
        provider: Arc<dyn AttestationProvider>,
        clock: Arc<dyn Clock>,
        config: PollingConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// Waits for a complete attestation of `tx_id` on `source_domain`.
    ///
    /// `on_pending` runs for every response that was indexed but not yet
    /// complete.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Cancelled`] once `cancel` fires
    /// - [`TransferError::AttestationTransportFailed`] for transport failures,
    ///   or when a configured `max_attempts` runs out
    pub async fn await_attestation<F>(
        &self,
        tx_id: &str,
        source_domain: DomainId,
        cancel: &CancellationToken,
        mut on_pending: F,
    ) -> Result<Attestation>
    where
        F: FnMut(Option<&AttestationStatus>) + Send,
    {
        let span = spans::await_attestation(tx_id, source_domain, self.config.poll_interval_secs);

        async move {
            let mut attempt: u32 = 0;
            loop {
                attempt += 1;
                tracing::Span::current().record("attempts", attempt);

                let response = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                    response = self.provider.get_messages(source_domain, tx_id) => response,
                };

                match response {
                    Ok(Some(response)) => {
                        if let Some(attestation) = response.first_complete() {
                            info!(attempt, event = "attestation_complete");
                            return Ok(attestation);
                        }
                        debug!(attempt, status = ?response.first_status(), event = "attestation_pending");
                        on_pending(response.first_status());
                    }
                    Ok(None) => {
                        debug!(attempt, event = "attestation_not_indexed");
                    }
                    Err(e) => {
                        spans::record_error_with_context(
                            "AttestationTransportFailed",
                            &e.to_string(),
                            Some(tx_id),
                        );
                        return Err(e);
                    }
                }

                if self.config.max_attempts.is_some_and(|max| attempt >= max) {
                    let reason = format!("attestation not available after {attempt} attempts");
                    spans::record_error_with_context("AttestationTransportFailed", &reason, None);
                    return Err(TransferError::AttestationTransportFailed { reason });
                }

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                    _ = self.clock.sleep(self.config.poll_interval()) => {}
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for AttestationPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationPoller")
            .field("config", &self.config)
            .finish()
    }
}
