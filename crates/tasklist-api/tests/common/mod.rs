#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use tasklist_api::auth::{AppState, AppStateInner, create_token};
use tasklist_api::credentials::PlaintextHasher;
use tasklist_api::routes::router;
use tasklist_db::Database;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: AppState,
    pub app: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: SECRET.into(),
            token_ttl: Duration::hours(1),
            hasher: Box::new(PlaintextHasher),
        });
        let app = router(state.clone());
        Self { state, app }
    }

    /// Inserts a user and returns (id, bearer token).
    pub fn user(&self, login: &str) -> (i64, String) {
        let email = format!("{login}@example.com");
        let user = self.state.db.add_user(login, &email, "password").unwrap();
        (user.id, token_for(user.id, login))
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn send_raw(&self, method: &str, uri: &str, token: &str, body: &str) -> StatusCode {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.app.clone().oneshot(req).await.unwrap().status()
    }
}

pub fn token_for(user_id: i64, login: &str) -> String {
    create_token(SECRET, Duration::hours(1), user_id, login, &format!("{login}@example.com")).unwrap()
}
