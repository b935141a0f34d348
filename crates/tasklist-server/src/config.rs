use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tasklist_api::credentials::HasherKind;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub hasher: HasherKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("TASKLIST_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("TASKLIST_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("TASKLIST_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("TASKLIST_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("TASKLIST_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("TASKLIST_HOST must be an IP address")?;

        let db_path: PathBuf = var("TASKLIST_DB_PATH")
            .unwrap_or_else(|| "tasklist.db".into())
            .into();

        let token_ttl_hours: i64 = var("TASKLIST_TOKEN_TTL_HOURS")
            .unwrap_or_else(|| "24".into())
            .parse()
            .context("TASKLIST_TOKEN_TTL_HOURS must be an integer")?;
        if token_ttl_hours <= 0 {
            bail!("TASKLIST_TOKEN_TTL_HOURS must be positive");
        }

        let hasher: HasherKind = var("TASKLIST_PASSWORD_HASHER")
            .unwrap_or_else(|| "argon2".into())
            .parse()?;

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
            token_ttl_hours,
            hasher,
        })
    }
}
