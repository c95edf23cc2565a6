//! Iris HTTP client against a mock server

use cctp_transfer::providers::IrisAttestationProvider;
use cctp_transfer::{AttestationProvider, AttestationStatus, DomainId, ErrorKind};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TX: &str = "0x7f1ba3c1a5f7e6a46c29d6a6a9e61d3d1b3d9c0a7a6f1e2d3c4b5a6978877665";

async fn mock(server: &MockServer, domain: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/messages/{domain}")))
        .and(query_param("transactionHash", TX))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_not_found_means_not_indexed() {
    let server = MockServer::start().await;
    mock(&server, 0, ResponseTemplate::new(404)).await;

    let provider = IrisAttestationProvider::new(server.uri());
    let response = provider.get_messages(DomainId::Ethereum, TX).await.unwrap();

    assert!(response.is_none());
}

#[tokio::test]
async fn test_server_error_is_a_transport_failure() {
    let server = MockServer::start().await;
    mock(&server, 6, ResponseTemplate::new(500)).await;

    let provider = IrisAttestationProvider::new(server.uri());
    let err = provider.get_messages(DomainId::Base, TX).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AttestationTransportFailed);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_complete_message() {
    let server = MockServer::start().await;
    mock(
        &server,
        5,
        ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{
                "status": "complete",
                "message": "0xdeadbeef",
                "attestation": "0xcafe",
                "eventNonce": "42"
            }]
        })),
    )
    .await;

    let provider = IrisAttestationProvider::new(format!("{}/", server.uri()));
    let response = provider
        .get_messages(DomainId::Solana, TX)
        .await
        .unwrap()
        .unwrap();

    let attestation = response.first_complete().unwrap();
    assert_eq!(attestation.message.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(attestation.attestation.as_ref(), &[0xca, 0xfe]);
}

#[tokio::test]
async fn test_pending_attestation_is_not_complete() {
    let server = MockServer::start().await;
    mock(
        &server,
        0,
        ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{
                "status": "pending_confirmations",
                "message": "0xdeadbeef",
                "attestation": "PENDING"
            }]
        })),
    )
    .await;

    let provider = IrisAttestationProvider::new(server.uri());
    let response = provider
        .get_messages(DomainId::Ethereum, TX)
        .await
        .unwrap()
        .unwrap();

    assert!(response.first_complete().is_none());
    assert_eq!(
        response.first_status(),
        Some(&AttestationStatus::PendingConfirmations)
    );
}

#[tokio::test]
async fn test_undecodable_body_is_treated_as_not_ready() {
    let server = MockServer::start().await;
    mock(
        &server,
        0,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let provider = IrisAttestationProvider::new(server.uri());
    let response = provider.get_messages(DomainId::Ethereum, TX).await.unwrap();

    assert!(response.is_none());
}
