#![allow(clippy::unwrap_used)]
// Integration tests for `SqlApiClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use svcsecret_api::{
    AccessToken, Binding, Error, SqlApiClient, StatementContext, TokenType, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SqlApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let token = AccessToken::new(TokenType::OAuth, SecretString::from("tok".to_string()));
    let client = SqlApiClient::new(base_url, &token, &TransportConfig::default())
        .unwrap()
        .with_poll_interval(Duration::from_millis(10));
    (server, client)
}

fn result_set(rows: serde_json::Value) -> serde_json::Value {
    json!({
        "resultSetMetaData": {
            "numRows": 1,
            "rowType": [{ "name": "RESULT", "type": "text", "nullable": true }]
        },
        "data": rows,
        "code": "090001",
        "statementHandle": "01b2c3d4-0000-0000-0000-000000000001",
        "message": "Statement executed successfully."
    })
}

// ── Execution ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_sends_bindings_and_auth() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(header("authorization", "Bearer tok"))
        .and(header("x-snowflake-authorization-token-type", "OAUTH"))
        .and(body_partial_json(json!({
            "statement": "CALL P(?, ?)",
            "bindings": {
                "1": { "type": "TEXT", "value": "DISABLE" },
                "2": { "type": "TEXT", "value": "SVC_X" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_set(json!([["SUCCESS"]]))))
        .expect(1)
        .mount(&server)
        .await;

    let rs = client
        .execute(
            "CALL P(?, ?)",
            &[Binding::text("DISABLE"), Binding::text("SVC_X")],
        )
        .await
        .unwrap();

    assert_eq!(rs.cell(0, 0), Some("SUCCESS"));
    assert_eq!(rs.column_names(), vec!["RESULT"]);
}

#[tokio::test]
async fn test_execute_sends_context_and_request_id() {
    let (server, client) = setup().await;
    let client = client.with_context(StatementContext {
        role: Some("SECURITYADMIN".into()),
        warehouse: Some("ADMIN_WH".into()),
        ..StatementContext::default()
    });

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .and(body_partial_json(json!({
            "role": "SECURITYADMIN",
            "warehouse": "ADMIN_WH",
            "timeout": 60
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(result_set(json!([["ok"]]))))
        .mount(&server)
        .await;

    client.execute("SELECT 1", &[]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let has_request_id = requests[0]
        .url
        .query_pairs()
        .any(|(k, v)| k == "requestId" && uuid_like(&v));
    assert!(has_request_id, "missing requestId in {}", requests[0].url);
}

fn uuid_like(v: &str) -> bool {
    v.len() == 36 && v.chars().filter(|c| *c == '-').count() == 4
}

#[tokio::test]
async fn test_async_statement_is_polled() {
    let (server, client) = setup().await;
    let handle = "01b2c3d4-0000-0000-0000-0000000000aa";

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "code": "333334",
            "message": "Asynchronous execution in progress.",
            "statementHandle": handle,
            "statementStatusUrl": format!("/api/v2/statements/{handle}")
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v2/statements/{handle}")))
        .and(query_param_is_missing("requestId"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(result_set(json!([["SUCCESS: done"]]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let rs = client.execute("CALL P()", &[]).await.unwrap();
    assert_eq!(rs.cell(0, 0), Some("SUCCESS: done"));
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "390303",
            "message": "Invalid OAuth access token."
        })))
        .mount(&server)
        .await;

    let err = client.execute("SELECT 1", &[]).await.unwrap_err();
    match err {
        Error::Authentication { message } => assert_eq!(message, "Invalid OAuth access token."),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_statement_error_is_structured() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "002003",
            "sqlState": "02000",
            "message": "SQL compilation error: Procedure does not exist or not authorized.",
            "statementHandle": "01b2-0000"
        })))
        .mount(&server)
        .await;

    let err = client.execute("CALL NOPE()", &[]).await.unwrap_err();
    assert!(
        matches!(
            err,
            Error::Statement { ref code, ref sql_state, .. }
                if code == "002003" && sql_state.as_deref() == Some("02000")
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_unstructured_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client.execute("SELECT 1", &[]).await.unwrap_err();
    assert!(
        matches!(err, Error::Http { status: 503, ref message } if message == "upstream unavailable"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client.execute("SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, Error::RateLimited { retry_after_secs: 7 }));
}

#[tokio::test]
async fn test_garbage_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/statements"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client.execute("SELECT 1", &[]).await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>login</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
