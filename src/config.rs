use std::env;
use std::str::FromStr;

use anyhow::{Context, bail};
use secrecy::{ExposeSecret, SecretString};

const MIN_JWT_SECRET_LENGTH: usize = 32;
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: SecretString,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub jwt_ttl_hours: i64,
    pub request_timeout_secs: u64,
    pub db_acquire_timeout_secs: u64,
    pub db_max_connections: u32,
    pub cart_merge_on_add: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} bytes");
        }

        let jwt_ttl_hours = validate_jwt_ttl_hours(parse_or("JWT_TTL_HOURS", 24))?;

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        Ok(Self {
            database_url: SecretString::from(database_url),
            host,
            port: parse_or("APP_PORT", 3000),
            jwt_secret: SecretString::from(jwt_secret),
            jwt_ttl_hours,
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30),
            db_acquire_timeout_secs: parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            cart_merge_on_add: parse_or("CART_MERGE_ON_ADD", false),
        })
    }

    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt_ttl_hours)
    }
}

/// Token lifetimes must be positive and at most `MAX_JWT_TTL_HOURS`.
pub fn validate_jwt_ttl_hours(hours: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_JWT_TTL_HOURS).contains(&hours) {
        bail!("JWT_TTL_HOURS must be between 1 and {MAX_JWT_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
