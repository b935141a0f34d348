mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tasklist_api::auth::{AppState, AppStateInner};
use tasklist_api::routes::router;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=debug,tasklist_api=debug,tasklist_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database; failure here aborts startup
    let db = tasklist_db::Database::open(&config.db_path)?;

    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        token_ttl: chrono::Duration::hours(config.token_ttl_hours),
        hasher: config.hasher.build(),
    });
    info!("Password hashing: {:?}", config.hasher);

    let app = router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("tasklist listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
