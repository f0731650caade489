mod support;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use consinco_api::EnvironmentRegistry;
use consinco_core::{InMemorySnapshotStore, TokenCache};
use consinco_domain::{Credential, Environment};
use consinco_infra::{ConsincoAuthenticator, ConsincoGateway, ErpEndpoints, HttpClient};
use serde_json::json;
use support::{app_with, body_json, request};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SQL_PATH: &str = "/ConstrutorAnaliseAPI/api/Analysis/GetSqlResult";
const TOKEN_COOKIE: &str =
    r#"oAuthToken={"access_token":"abc",".expires":"2099-01-01T00:00:00Z"}; path=/"#;

fn gateway(server: &MockServer, snapshots: Arc<InMemorySnapshotStore>) -> ConsincoGateway {
    let login_url = format!("{}/Login", server.uri());
    let login_client = HttpClient::builder().follow_redirects(false).build().unwrap();
    let authenticator = Arc::new(ConsincoAuthenticator::new(login_client, login_url.clone()));
    let tokens =
        Arc::new(TokenCache::new(Credential::new(login_url, 42, 1234), authenticator, snapshots));

    ConsincoGateway::new(
        Environment::Prod,
        ErpEndpoints::new(server.uri(), server.uri()),
        HttpClient::new().unwrap(),
        tokens,
    )
}

async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/Login"))
        .and(body_string_contains("Nome=42"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", TOKEN_COOKIE)
                .append_header("set-cookie", "ASP.NET_SessionId=sid; HttpOnly"),
        )
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sql_query_logs_in_once_and_reuses_the_token() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(SQL_PATH))
        .and(header("authorization", "Bearer abc"))
        .and(body_string_contains(r#""CommandText": "SELECT * FROM dual""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .expect(2)
        .mount(&server)
        .await;

    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let registry = EnvironmentRegistry::new(Environment::Prod)
        .with_gateway(Environment::Prod, Arc::new(gateway(&server, snapshots.clone())));
    let app = app_with(registry, false);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/sql/query",
                Some(json!({"sql_query": "SELECT * FROM dual"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "data": {"rows": []}, "error": null})
        );
    }

    let saved = snapshots.get("127.0.0.1").expect("snapshot saved after login");
    assert_eq!(saved.get("ASP.NET_SessionId"), Some("sid"));

    let response = app.oneshot(request(Method::GET, "/token/status", None)).await.unwrap();
    let status = body_json(response).await["status"].clone();
    assert_eq!(status["token_valido"], true);
    assert_eq!(status["validade"], "2099-01-01T00:00:00Z");
}

#[tokio::test]
async fn erp_500_is_reported_without_retry() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(SQL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("ORA-00942"))
        .expect(1)
        .mount(&server)
        .await;

    let registry = EnvironmentRegistry::new(Environment::Prod).with_gateway(
        Environment::Prod,
        Arc::new(gateway(&server, Arc::new(InMemorySnapshotStore::new()))),
    );

    let response = app_with(registry, false)
        .oneshot(request(Method::POST, "/sql/query", Some(json!({"sql_query": "SELECT 1"}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"], json!(null));
    assert!(body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn rejected_login_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SQL_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let registry = EnvironmentRegistry::new(Environment::Prod).with_gateway(
        Environment::Prod,
        Arc::new(gateway(&server, Arc::new(InMemorySnapshotStore::new()))),
    );

    let response = app_with(registry, false)
        .oneshot(request(Method::POST, "/sql/query", Some(json!({"sql_query": "SELECT 1"}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
