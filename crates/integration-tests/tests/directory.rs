//! Directory endpoints: bearer enforcement, listing, lookup and deletion.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use bolao_integration_tests::{STRONG_PASSWORD, TestApp};

async fn seed_accounts(app: &TestApp, count: usize) -> String {
    let token = app.register("Caller", "caller@example.com").await;
    for i in 1..count {
        app.register(&format!("User {i:02}"), &format!("user{i}@example.com"))
            .await;
    }
    token
}

// ============================================================================
// Bearer enforcement
// ============================================================================

#[tokio::test]
async fn test_directory_requires_token() {
    let app = TestApp::spawn().await;

    for (method, uri) in [
        (Method::GET, "/users"),
        (Method::GET, "/user/00000000-0000-0000-0000-000000000000"),
        (Method::DELETE, "/user/00000000-0000-0000-0000-000000000000"),
    ] {
        let response = app.request(method, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.body["success"], false);
    }

    let response = app
        .request(
            Method::POST,
            "/user",
            None,
            Some(&json!({"name": "X", "email": "x@example.com", "password": STRONG_PASSWORD})),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.register("Ana", "ana@example.com").await;

    let (head, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{head}.{flipped}{}", &signature[1..]);

    let response = app.get_authed("/users", &tampered).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get_authed("/users", "not-a-jwt").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("Ana", "ana@example.com").await;
    let user = app
        .state
        .credentials()
        .find_by_email("ana@example.com")
        .await
        .unwrap()
        .unwrap();

    let stale = app
        .state
        .tokens()
        .issue_at(&user, Utc::now() - Duration::hours(48))
        .unwrap();

    let response = app.get_authed("/users", &stale).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_scheme_is_case_insensitive() {
    let app = TestApp::spawn().await;
    let token = app.register("Ana", "ana@example.com").await;

    let request = axum::http::Request::builder()
        .method(Method::GET)
        .uri("/users")
        .header("authorization", format!("bearer {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_pages_through_25_accounts() {
    let app = TestApp::spawn().await;
    let token = seed_accounts(&app, 25).await;

    for (page, expected) in [(1, 10), (2, 10), (3, 5), (4, 0)] {
        let response = app
            .get_authed(&format!("/users?page={page}&pageSize=10"), &token)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let data = &response.body["data"];
        assert_eq!(data["items"].as_array().unwrap().len(), expected, "page {page}");
        assert_eq!(data["totalCount"], 25);
        assert_eq!(data["totalPages"], 3);
        assert_eq!(data["page"], page);
        assert_eq!(data["pageSize"], 10);
    }
}

#[tokio::test]
async fn test_list_is_oldest_first() {
    let app = TestApp::spawn().await;
    let token = seed_accounts(&app, 3).await;

    let response = app.get_authed("/users", &token).await;
    let names: Vec<_> = response.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Caller", "User 01", "User 02"]);
}

#[tokio::test]
async fn test_list_filters_by_name_substring() {
    let app = TestApp::spawn().await;
    let token = app.register("Ana Silva", "ana@example.com").await;
    app.register("Mariana", "mariana@example.com").await;
    app.register("Bruno", "bruno@example.com").await;

    for uri in ["/users?nome=ana", "/users?name=ANA"] {
        let response = app.get_authed(uri, &token).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["totalCount"], 2, "{uri}");
    }
}

#[tokio::test]
async fn test_list_coerces_non_positive_paging() {
    let app = TestApp::spawn().await;
    let token = seed_accounts(&app, 3).await;

    let response = app
        .get_authed("/users?page=0&pageSize=-5", &token)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["page"], 1);
    assert_eq!(response.body["data"]["pageSize"], 10);
    assert_eq!(response.body["data"]["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_rejects_non_numeric_paging() {
    let app = TestApp::spawn().await;
    let token = app.register("Ana", "ana@example.com").await;

    let response = app.get_authed("/users?pageSize=lots", &token).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid request");
}

#[tokio::test]
async fn test_list_never_exposes_password_material() {
    let app = TestApp::spawn().await;
    let token = app.register("Ana", "ana@example.com").await;

    let response = app.get_authed("/users", &token).await;
    let text = response.body.to_string();
    assert!(!text.contains("argon2"));
    assert!(!text.to_lowercase().contains("password"));
}

// ============================================================================
// Create, lookup and delete
// ============================================================================

#[tokio::test]
async fn test_create_get_delete_account() {
    let app = TestApp::spawn().await;
    let token = app.register("Caller", "caller@example.com").await;

    let created = app
        .request(
            Method::POST,
            "/user",
            Some(&token),
            Some(&json!({"name": "Bruno", "email": "bruno@example.com", "password": STRONG_PASSWORD})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["message"], "User created successfully");
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let fetched = app.get_authed(&format!("/user/{id}"), &token).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"], created.body["data"]);

    let deleted = app
        .request(Method::DELETE, &format!("/user/{id}"), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["success"], true);

    let gone = app.get_authed(&format!("/user/{id}"), &token).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "User not found");

    let again = app
        .request(Method::DELETE, &format!("/user/{id}"), Some(&token), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_duplicate_account() {
    let app = TestApp::spawn().await;
    let token = app.register("Caller", "caller@example.com").await;

    let response = app
        .request(
            Method::POST,
            "/user",
            Some(&token),
            Some(&json!({"name": "Again", "email": "CALLER@example.com", "password": STRONG_PASSWORD})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Email already in use");
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.register("Caller", "caller@example.com").await;

    let response = app.get_authed("/user/not-a-uuid", &token).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_account_cannot_log_in() {
    let app = TestApp::spawn().await;
    let token = app.register("Caller", "caller@example.com").await;
    let victim_token = app.register("Bruno", "bruno@example.com").await;
    let victim = app.state.tokens().validate(&victim_token).unwrap();

    let deleted = app
        .request(Method::DELETE, &format!("/user/{}", victim.sub), Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let login = app
        .post(
            "/login",
            &json!({"email": "bruno@example.com", "password": STRONG_PASSWORD}),
        )
        .await;
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
}
