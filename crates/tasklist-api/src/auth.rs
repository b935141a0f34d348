use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tracing::{info, warn};

use tasklist_db::{Database, DbError};
use tasklist_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, VerifyResponse};
use tasklist_types::models::User;

use crate::credentials::CredentialHasher;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::run_db;

pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub hasher: Box<dyn CredentialHasher>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<User>, ApiError> {
    validate_registration(&req)?;

    // Hashing is CPU-bound, so it runs on the blocking pool with the insert
    let user = run_db(&state, move |st| {
        if st.db.get_user_by_login(&req.username)?.is_some() {
            return Err(ApiError::Validation(format!(
                "login '{}' is already taken",
                req.username
            )));
        }

        let stored = st
            .hasher
            .hash(&req.password)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        // The lookup above and this insert are separate lock scopes; a
        // concurrent registration can still win the UNIQUE(login) race.
        st.db
            .add_user(&req.username, &req.email, &stored)
            .map_err(|e| registration_error(e, &req.username))
    })
    .await?;

    info!("Registered user {} (id {})", user.login, user.id);
    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.clone();

    let user = run_db(&state, move |st| {
        let user = st
            .db
            .get_user_by_login(&req.username)?
            .ok_or(ApiError::Unauthorized)?;

        let ok = st
            .hasher
            .verify(&req.password, &user.password)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        if !ok {
            return Err(ApiError::Unauthorized);
        }
        Ok(user)
    })
    .await
    .inspect_err(|e| {
        if matches!(e, ApiError::Unauthorized) {
            warn!("Failed login for '{}'", username);
        }
    })?;

    let token = create_token(
        &state.jwt_secret,
        state.token_ttl,
        user.id,
        &user.login,
        &user.email,
    )
    .map_err(|e| ApiError::Internal(format!("creating token: {}", e)))?;

    Ok(Json(LoginResponse {
        message: "You were logged in!".into(),
        token,
    }))
}

/// Echoes the identity carried by the caller's token.
pub async fn verify(Extension(claims): Extension<Claims>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        id: claims.sub,
        login: claims.login,
        email: claims.email,
    })
}

/// Tokens are stateless, so there is nothing to revoke; reaching this
/// handler means the middleware accepted the caller's claims.
pub async fn logout(Extension(claims): Extension<Claims>) -> Json<serde_json::Value> {
    info!("User {} logged out", claims.sub);
    Json(serde_json::json!({ "message": "You were logged out" }))
}

/// Deletes the calling account along with its lists and todos.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<usize>, ApiError> {
    let user_id = claims.sub;
    let n = run_db(&state, move |st| Ok(st.db.delete_user_by_id(user_id)?)).await?;

    info!("Deleted account {} ({} rows)", user_id, n);
    Ok(Json(n))
}

pub fn create_token(
    secret: &str,
    ttl: Duration,
    user_id: i64,
    login: &str,
    email: &str,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        login: login.to_string(),
        email: email.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::new(TOKEN_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn registration_error(e: DbError, login: &str) -> ApiError {
    if e.is_constraint_violation() {
        ApiError::Validation(format!("login '{}' is already taken", login))
    } else {
        e.into()
    }
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let login_len = req.username.chars().count();
    if !(3..=32).contains(&login_len) {
        return Err(ApiError::Validation(
            "username must be 3 to 32 characters".into(),
        ));
    }
    if !req.email.contains('@') {
        return Err(ApiError::Validation("email is not valid".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn duplicate_login_insert_is_a_validation_error() {
        let db = Database::open_in_memory().unwrap();
        db.add_user("alice", "alice@example.com", "pw").unwrap();

        let err = db.add_user("alice", "other@example.com", "pw").unwrap_err();
        let mapped = registration_error(err, "alice");
        assert!(matches!(mapped, ApiError::Validation(_)));
        assert_eq!(mapped.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_db_failures_stay_server_errors() {
        let err = DbError::LockPoisoned("boom".into());
        assert!(matches!(registration_error(err, "alice"), ApiError::Database(_)));
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration(&request("alice", "a@example.com", "long enough")).is_ok());
        assert!(validate_registration(&request("al", "a@example.com", "long enough")).is_err());
        assert!(validate_registration(&request("alice", "nope", "long enough")).is_err());
        assert!(validate_registration(&request("alice", "a@example.com", "short")).is_err());
    }
}
