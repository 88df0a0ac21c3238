use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use rand::RngCore;

use crate::auth::decode_secret_key;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub feed_capacity: usize,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = var_or(key, default);
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid {key}: '{raw}'"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = parse_var("TWODO_LISTEN_ADDR", "0.0.0.0:8080")?;
        let db_path = var_or("TWODO_DB_PATH", "./db/twodo.db");
        let cors_allow = var_or("TWODO_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_var("TWODO_REQUEST_TIMEOUT_MS", "30000")?;
        let token_ttl_secs: u64 = parse_var("TWODO_TOKEN_TTL_SECS", "604800")?;
        let feed_capacity: usize = parse_var("TWODO_FEED_CAPACITY", "256")?;

        let jwt_secret = match std::env::var("TWODO_JWT_SECRET") {
            Ok(raw) => decode_secret_key(&raw).context("Invalid TWODO_JWT_SECRET")?,
            Err(_) => {
                let mut bytes = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut bytes);
                tracing::warn!(
                    "TWODO_JWT_SECRET is not set; using a random secret. Tokens will not survive a restart."
                );
                bytes.to_vec()
            }
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
            feed_capacity,
        })
    }
}
