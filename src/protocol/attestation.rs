use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer};

/// Body of `GET /v2/messages/{domain}?transactionHash={tx}`
///
/// A single burn transaction can emit several `MessageSent` events, so the
/// service answers with a list. Transfers driven by this crate only ever emit
/// one, and only the first entry is inspected.
///
/// ```json
/// {
///   "messages": [
///     { "status": "complete", "message": "0x...", "attestation": "0x..." }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct V2AttestationResponse {
    #[serde(default)]
    pub messages: Vec<V2Message>,
}

impl V2AttestationResponse {
    /// Returns the attestation when the first message is complete and carries
    /// both the message and the signature bytes
    pub fn first_complete(&self) -> Option<Attestation> {
        let first = self.messages.first()?;
        if first.status != AttestationStatus::Complete {
            return None;
        }
        Some(Attestation {
            message: first.message.clone()?,
            attestation: first.attestation.clone()?,
            status: AttestationStatus::Complete,
        })
    }

    /// Status of the first message, if there is one
    pub fn first_status(&self) -> Option<&AttestationStatus> {
        self.messages.first().map(|m| &m.status)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Message {
    pub status: AttestationStatus,

    /// Raw message bytes from the `MessageSent` event
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,

    /// Signature bytes, absent until the status is complete
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

/// Iris sometimes reports `"PENDING"` where it means `null`.
///
/// - hex string (with or without `0x`) → `Some(Bytes)`
/// - `"PENDING"` in any case, `""`, `null` or a missing field → `None`
/// - anything else is an error
fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

/// Attestation status as reported by Iris
///
/// Unrecognised strings deserialize to [`AttestationStatus::Other`] so a new
/// server-side status keeps the poller polling instead of failing the decode.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
    #[serde(other)]
    Other,
}

/// A signed burn message, ready to be presented to the destination chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub message: Bytes,
    pub attestation: Bytes,
    pub status: AttestationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_response() {
        let json = r#"{
            "messages": [
                {
                    "status": "complete",
                    "message": "0xdeadbeef",
                    "attestation": "0x1234abcd"
                }
            ]
        }"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        let attestation = response.first_complete().unwrap();
        assert_eq!(attestation.message.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            attestation.attestation.to_vec(),
            vec![0x12, 0x34, 0xab, 0xcd]
        );
        assert_eq!(attestation.status, AttestationStatus::Complete);
    }

    #[test]
    fn test_pending_string_is_none() {
        let json = r#"{
            "messages": [
                { "status": "pending", "message": "PENDING", "attestation": "pending" }
            ]
        }"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.first_status(), Some(&AttestationStatus::Pending));
        assert!(response.messages[0].message.is_none());
        assert!(response.messages[0].attestation.is_none());
        assert!(response.first_complete().is_none());
    }

    #[test]
    fn test_complete_without_attestation_bytes_is_not_ready() {
        let json = r#"{"messages": [{ "status": "complete", "message": "0xaa" }]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        assert!(response.first_complete().is_none());
    }

    #[test]
    fn test_only_first_message_counts() {
        let json = r#"{
            "messages": [
                { "status": "pending_confirmations", "message": "0xaa", "attestation": null },
                { "status": "complete", "message": "0xcc", "attestation": "0xdd" }
            ]
        }"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        assert_eq!(
            response.first_status(),
            Some(&AttestationStatus::PendingConfirmations)
        );
        assert!(response.first_complete().is_none());
    }

    #[test]
    fn test_empty_and_missing_messages() {
        let empty: V2AttestationResponse = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert!(empty.first_status().is_none());

        let missing: V2AttestationResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.messages.is_empty());
    }

    #[test]
    fn test_unknown_status_is_other() {
        let json = r#"{"messages": [{ "status": "reattested" }]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.first_status(), Some(&AttestationStatus::Other));
    }

    #[test]
    fn test_invalid_hex_fails() {
        let json = r#"{"messages": [{ "status": "complete", "attestation": "not_hex" }]}"#;
        assert!(serde_json::from_str::<V2AttestationResponse>(json).is_err());
    }
}
