//! Program-chain account reads against a mock JSON-RPC node

use cctp_transfer::providers::SolanaRpcReader;
use cctp_transfer::{ErrorKind, ProgramChainReader};
use serde_json::json;
use solana_sdk::pubkey::Pubkey;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getAccountInfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_account_data_is_decoded() {
    let server = MockServer::start().await;
    mock(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": {
                    "data": ["AQID", "base64"],
                    "executable": false,
                    "lamports": 2039280,
                    "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                    "rentEpoch": 0,
                    "space": 3
                }
            }
        }),
    )
    .await;

    let reader = SolanaRpcReader::new(server.uri());
    let data = reader.account_data(&Pubkey::new_unique()).await.unwrap();

    assert_eq!(data, Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn test_missing_account_is_none() {
    let server = MockServer::start().await;
    mock(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "context": { "slot": 1 }, "value": null }
        }),
    )
    .await;

    let reader = SolanaRpcReader::new(server.uri());

    assert_eq!(reader.account_data(&Pubkey::new_unique()).await.unwrap(), None);
}

#[tokio::test]
async fn test_rpc_error_is_a_provider_failure() {
    let server = MockServer::start().await;
    mock(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid param: WrongSize" }
        }),
    )
    .await;

    let reader = SolanaRpcReader::new(server.uri());
    let err = reader.account_data(&Pubkey::new_unique()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(err.to_string().contains("getAccountInfo"));
}
