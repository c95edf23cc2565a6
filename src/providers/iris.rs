//! Circle Iris API attestation provider implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, trace, warn};
use url::Url;

use crate::error::{Result, TransferError};
use crate::protocol::{DomainId, V2AttestationResponse};
use crate::spans;
use crate::traits::AttestationProvider;

pub const IRIS_SANDBOX_URL: &str = "https://iris-api-sandbox.circle.com";
pub const IRIS_PRODUCTION_URL: &str = "https://iris-api.circle.com";

/// Production attestation provider using Circle's Iris API.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_transfer::providers::IrisAttestationProvider;
/// use cctp_transfer::{AttestationProvider, DomainId};
///
/// # async fn example() -> Result<(), cctp_transfer::TransferError> {
/// let provider = IrisAttestationProvider::sandbox();
/// let response = provider
///     .get_messages(DomainId::Ethereum, "0x1234...")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a provider for the Iris deployment at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Creates a provider for Circle's production environment.
    pub fn production() -> Self {
        Self::new(IRIS_PRODUCTION_URL)
    }

    /// Creates a provider for Circle's sandbox (testnet) environment.
    pub fn sandbox() -> Self {
        Self::new(IRIS_SANDBOX_URL)
    }

    /// `{base}/v2/messages/{domain}?transactionHash={tx}`
    pub fn messages_url(&self, source_domain: DomainId, tx_id: &str) -> Result<Url> {
        let raw = format!(
            "{}/v2/messages/{}",
            self.base_url.trim_end_matches('/'),
            source_domain.as_u32()
        );
        let mut url = Url::parse(&raw).map_err(|e| {
            TransferError::InvalidConfig(format!("invalid Iris URL {:?}: {e}", self.base_url))
        })?;
        url.query_pairs_mut().append_pair("transactionHash", tx_id);
        Ok(url)
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(
        name = "cctp_transfer.get_messages",
        skip(self),
        fields(
            source_domain = source_domain.as_u32(),
            error.type = tracing::field::Empty,
            error.message = tracing::field::Empty,
            error.context = tracing::field::Empty,
            otel.status_code = "OK",
        )
    )]
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx_id: &str,
    ) -> Result<Option<V2AttestationResponse>> {
        let url = self.messages_url(source_domain, tx_id)?;
        trace!(url = %url, "Requesting messages from Iris API");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            TransferError::AttestationTransportFailed {
                reason: e.to_string(),
            }
        })?;

        let status_code = response.status();
        trace!(status_code = %status_code, "Received response from Iris API");

        if status_code == StatusCode::NOT_FOUND {
            debug!(event = "attestation_not_indexed");
            return Ok(None);
        }

        if !status_code.is_success() {
            let reason = format!("Iris API returned HTTP {status_code} for {url}");
            spans::record_error_with_context("AttestationTransportFailed", &reason, None);
            return Err(TransferError::AttestationTransportFailed { reason });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransferError::AttestationTransportFailed {
                reason: e.to_string(),
            })?;

        match serde_json::from_str::<V2AttestationResponse>(&body) {
            Ok(parsed) => {
                debug!(
                    messages = parsed.messages.len(),
                    status = ?parsed.first_status(),
                    event = "attestation_response_parsed"
                );
                Ok(Some(parsed))
            }
            Err(e) => {
                // treated as not ready; the poller asks again on the next tick
                warn!(error = %e, event = "attestation_response_undecodable");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let provider = IrisAttestationProvider::sandbox();
        let url = provider.messages_url(DomainId::Base, "0xabc").unwrap();
        insta::assert_snapshot!(
            url.as_str(),
            @"https://iris-api-sandbox.circle.com/v2/messages/6?transactionHash=0xabc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let provider = IrisAttestationProvider::new("not a url");
        let err = provider.messages_url(DomainId::Base, "0xabc").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidConfig);
    }
}
