mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use tasklist_api::middleware::decode_token;

#[tokio::test]
async fn register_then_login() {
    let t = TestApp::new();

    let (status, user) = t
        .send(
            "POST",
            "/auth/register",
            None,
            Some(json!({ "username": "alice", "email": "alice@example.com", "password": "hunter2222" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["login"], "alice");
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("password").is_none());
    assert!(user["register_date"].is_string());

    let (status, body) = t
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "hunter2222" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You were logged in!");

    let claims = decode_token(common::SECRET, body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, user["id"].as_i64().unwrap());
    assert_eq!(claims.login, "alice");
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let t = TestApp::new();
    t.user("alice");

    for body in [
        json!({ "username": "alice", "email": "a2@example.com", "password": "long enough" }),
        json!({ "username": "al", "email": "al@example.com", "password": "long enough" }),
        json!({ "username": "carol", "email": "carol", "password": "long enough" }),
        json!({ "username": "carol", "email": "carol@example.com", "password": "short" }),
        json!({ "username": "carol" }),
    ] {
        let (status, _) = t.send("POST", "/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn login_with_wrong_credentials_is_unauthorized() {
    let t = TestApp::new();
    t.user("alice");

    let (status, _) = t
        .send("POST", "/auth/login", None, Some(json!({ "username": "alice", "password": "nope" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .send("POST", "/auth/login", None, Some(json!({ "username": "zed", "password": "password" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_echoes_token_identity() {
    let t = TestApp::new();
    let (alice, token) = t.user("alice");

    let (status, body) = t.send("GET", "/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": alice, "login": "alice", "email": "alice@example.com" }));
}

#[tokio::test]
async fn logout_requires_a_token() {
    let t = TestApp::new();
    let (_, token) = t.user("alice");

    let (status, body) = t.send("POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You were logged out");

    let (status, _) = t.send("POST", "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_account_removes_owned_data() {
    let t = TestApp::new();
    let (alice, token) = t.user("alice");
    let list = t.state.db.add_list("Groceries", alice).unwrap().id;
    t.state.db.add_todo("milk", "", list, alice).unwrap();

    let (status, body) = t.send("DELETE", "/auth/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(1));

    assert!(t.state.db.get_user_by_login("alice").unwrap().is_none());
    assert!(t.state.db.get_all_lists().unwrap().is_empty());
    assert!(t.state.db.get_all_todos().unwrap().is_empty());
}

#[tokio::test]
async fn health_needs_no_token() {
    let t = TestApp::new();
    let (status, _) = t.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
