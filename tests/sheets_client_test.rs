//! Sheets client against a mocked Sheets v4 API
//!
//! Run with: cargo test --test sheets_client_test

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use partnerbot::core::AppError;
use partnerbot::sheets::{PartnerLedger, PartnerRow, ServiceAccount, SheetsClient, StaticToken, TokenSource};

const FULL_RANGE_PATH: &str = "/v4/spreadsheets/sheet-id/values/%27Sheet1%27%21A%3AZZ";
const CODE_COLUMN_PATH: &str = "/v4/spreadsheets/sheet-id/values/%27Sheet1%27%21A%3AA";
const APPEND_PATH: &str = "/v4/spreadsheets/sheet-id/values/%27Sheet1%27%21A%3AA:append";
const TEST_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn client(server: &MockServer, tokens: Arc<dyn TokenSource>) -> SheetsClient {
    SheetsClient::new(reqwest::Client::new(), &server.uri(), "sheet-id", "Sheet1", tokens)
}

fn static_client(server: &MockServer) -> SheetsClient {
    client(server, Arc::new(StaticToken("test-token".to_string())))
}

fn values(rows: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "range": "Sheet1!A1:ZZ100",
        "majorDimension": "ROWS",
        "values": rows,
    }))
}

fn partner_row() -> PartnerRow {
    PartnerRow {
        partner_code: "42".to_string(),
        name: "Анна".to_string(),
        contact: "+79991234567".to_string(),
        username: Some("anna".to_string()),
    }
}

#[tokio::test]
async fn test_balance_sums_numeric_cells() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FULL_RANGE_PATH))
        .and(query_param("valueRenderOption", "UNFORMATTED_VALUE"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(values(json!([
            ["Код", "Имя", "Контакт"],
            [7, "Иван", "+79990000007", 10],
            ["42", 100.50, "note", 200.75],
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let balance = static_client(&server).get_balance("42").await.unwrap();
    assert_eq!(balance, 301.25);
}

#[tokio::test]
async fn test_balance_matches_numeric_code_cell() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FULL_RANGE_PATH))
        .respond_with(values(json!([["Код"], [1454702347, "Анна", "+79991234567", 500]])))
        .mount(&server)
        .await;

    let balance = static_client(&server).get_balance("1454702347").await.unwrap();
    assert_eq!(balance, 500.0);
}

#[tokio::test]
async fn test_balance_for_absent_partner_is_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FULL_RANGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "range": "Sheet1!A1:ZZ1" })))
        .mount(&server)
        .await;

    assert_eq!(static_client(&server).get_balance("42").await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_balance_auth_failure_is_integration_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FULL_RANGE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = static_client(&server).get_balance("42").await.unwrap_err();
    assert!(matches!(err, AppError::Integration(_)));
}

#[tokio::test]
async fn test_append_writes_new_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CODE_COLUMN_PATH))
        .respond_with(values(json!([["Код"], ["7"]])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .and(query_param("valueInputOption", "RAW"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .and(body_json(json!({ "values": [["42", "Анна", "+79991234567", "@anna"]] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updates": { "updatedRows": 1 } })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(static_client(&server).append_partner_row(&partner_row()).await.unwrap());
}

#[tokio::test]
async fn test_append_skips_existing_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CODE_COLUMN_PATH))
        .respond_with(values(json!([["Код"], [42]])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!static_client(&server).append_partner_row(&partner_row()).await.unwrap());
}

#[tokio::test]
async fn test_append_failure_is_integration_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CODE_COLUMN_PATH))
        .respond_with(values(json!([["Код"]])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(APPEND_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = static_client(&server).append_partner_row(&partner_row()).await.unwrap_err();
    assert!(err.is_integration());
}

#[tokio::test]
async fn test_connection_check() {
    let server = MockServer::start().await;
    assert!(!static_client(&server).test_connection().await);

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-id/values/%27Sheet1%27%21A1"))
        .respond_with(values(json!([["Код"]])))
        .mount(&server)
        .await;
    assert!(static_client(&server).test_connection().await);
}

#[tokio::test]
async fn test_worksheet_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CODE_COLUMN_PATH))
        .respond_with(values(json!([["Код"], ["7"], [42], [""]])))
        .mount(&server)
        .await;

    let info = static_client(&server).worksheet_info().await.unwrap();
    assert_eq!(info.row_count, 4);
    assert_eq!(info.partner_count, 2);
}

fn service_account(server: &MockServer) -> ServiceAccount {
    let key = json!({
        "type": "service_account",
        "client_email": "partnerbot@test-project.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": format!("{}/token", server.uri()),
    });
    ServiceAccount::from_json(&key.to_string(), reqwest::Client::new()).unwrap()
}

fn token_response(expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "ya29.test",
        "expires_in": expires_in,
        "token_type": "Bearer",
    }))
}

#[tokio::test]
async fn test_service_account_token_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .and(body_string_contains("assertion="))
        .respond_with(token_response(3600))
        .expect(1)
        .mount(&server)
        .await;

    let account = service_account(&server);
    assert_eq!(account.access_token().await.unwrap(), "ya29.test");
    assert_eq!(account.access_token().await.unwrap(), "ya29.test");
}

#[tokio::test]
async fn test_short_lived_token_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response(30))
        .expect(2)
        .mount(&server)
        .await;

    let account = service_account(&server);
    account.access_token().await.unwrap();
    account.access_token().await.unwrap();
}

#[tokio::test]
async fn test_token_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;

    let err = service_account(&server).access_token().await.unwrap_err();
    assert!(matches!(err, AppError::Integration(_)));
}

#[tokio::test]
async fn test_client_uses_service_account_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response(3600))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(FULL_RANGE_PATH))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(values(json!([["42", 10, 15]])))
        .expect(2)
        .mount(&server)
        .await;

    let sheets = client(&server, Arc::new(service_account(&server)));
    assert_eq!(sheets.get_balance("42").await.unwrap(), 25.0);
    assert_eq!(sheets.get_balance("42").await.unwrap(), 25.0);
}
