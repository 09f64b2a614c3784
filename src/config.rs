/*
 * Responsibility
 * - 環境変数から設定を読み込む (DATABASE_URL, JWT secret, token TTL など)
 * - 起動時に検証する (欠落 / 不正な値は起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600; // 1 hour
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 60 * 24 * 60 * 60; // 60 days

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// HMAC key material for access tokens.
///
/// Loaded once at startup and never mutated; clones share the same allocation.
/// Debug output never prints the key.
#[derive(Clone)]
pub struct SigningSecret(Arc<str>);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        Ok(Self(Arc::from(trimmed)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(**redacted**)")
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None in development means "use the in-process store"
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub jwt_secret: SigningSecret,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub webhook_api_key: Option<String>,

    pub request_body_limit_bytes: usize,
    pub request_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or("PORT", &lookup, DEFAULT_PORT)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let database_url = lookup("DATABASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", &lookup, 5u32)?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_secret = SigningSecret::new(jwt_secret)?;

        let access_token_ttl_seconds = parse_or(
            "ACCESS_TOKEN_TTL_SECONDS",
            &lookup,
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        )?;
        if access_token_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }
        let refresh_token_ttl_seconds = parse_or(
            "REFRESH_TOKEN_TTL_SECONDS",
            &lookup,
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        )?;
        if refresh_token_ttl_seconds <= 0 {
            return Err(ConfigError::Invalid("REFRESH_TOKEN_TTL_SECONDS"));
        }

        let sqids_min_length = parse_or("SQIDS_MIN_LENGTH", &lookup, 10usize)?;
        let sqids_alphabet = lookup("SQIDS_ALPHABET").unwrap_or_else(|| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let webhook_api_key = lookup("WEBHOOK_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let request_body_limit_bytes =
            parse_or("REQUEST_BODY_LIMIT_BYTES", &lookup, 1024 * 1024usize)?;
        let request_timeout_seconds = parse_or("REQUEST_TIMEOUT_SECONDS", &lookup, 30u64)?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            database_max_connections,
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_seconds),
            refresh_token_ttl: Duration::seconds(refresh_token_ttl_seconds),
            sqids_min_length,
            sqids_alphabet,
            webhook_api_key,
            request_body_limit_bytes,
            request_timeout_seconds,
        })
    }
}

// Absent -> default, present but unparsable -> Invalid (a typo should not silently fall back)
fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
    }
}
