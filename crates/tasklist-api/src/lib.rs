pub mod acl;
pub mod auth;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod lists;
pub mod middleware;
pub mod routes;
pub mod todos;

use tracing::error;

use crate::auth::{AppState, AppStateInner};
use crate::error::ApiError;

/// Run blocking DB work off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("background task failed".into())
        })?
}
