//! Smoke tests against a running server.
//!
//! Run with `cargo test -p bolao-integration-tests -- --ignored`.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use bolao_integration_tests::{STRONG_PASSWORD, live_base_url};

fn unique_email() -> String {
    format!("live-{}@example.com", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "Requires running bolao-api server"]
async fn test_health_endpoints() {
    let client = Client::new();
    let base = live_base_url();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running bolao-api server"]
async fn test_register_login_and_list() {
    let client = Client::new();
    let base = live_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({"name": "Live Test", "email": email, "password": STRONG_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({"email": email, "password": STRONG_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/users?nome=Live&pageSize=5"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["totalCount"].as_u64().unwrap() >= 1);
}

#[tokio::test]
#[ignore = "Requires running bolao-api server"]
async fn test_users_without_token_is_unauthorized() {
    let client = Client::new();
    let resp = client
        .get(format!("{}/users", live_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
