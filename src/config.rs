//! Configuration module for tokengate.
//!
//! Configuration is read once at startup from a TOML file, optionally
//! overridden from the environment, validated, and then handed to each
//! component's constructor.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, TokengateError};

/// HMAC algorithms accepted for token signing.
pub const SUPPORTED_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

/// Longest accepted token lifetime, ten years in minutes.
pub const MAX_TOKEN_TTL_MINS: u64 = 10 * 365 * 24 * 60;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` when deriving the client key.
    ///
    /// Only enable behind a reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            trust_proxy_headers: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    #[serde(default = "default_db_url")]
    pub url: String,
}

fn default_db_url() -> String {
    "sqlite://data/tokengate.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

/// Token and cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (must be set).
    #[serde(default)]
    pub secret_key: String,
    /// Signing algorithm (HS256, HS384 or HS512).
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_mins: u64,
    /// Refresh token lifetime in minutes.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_mins: u64,
    /// Set the `Secure` attribute on token cookies.
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    1440 // 24 hours
}

fn default_secure_cookie() -> bool {
    true
}

impl AuthConfig {
    /// Access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_mins.saturating_mul(60))
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_mins.saturating_mul(60))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: default_algorithm(),
            access_token_ttl_mins: default_access_ttl(),
            refresh_token_ttl_mins: default_refresh_ttl(),
            secure_cookie: default_secure_cookie(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Time cost (iterations).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    65536 // 64 MB
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Login rate limiting configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitSettings {
    /// Login attempts admitted per client per window.
    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u32,
    /// Window length in seconds.
    #[serde(default = "default_login_window")]
    pub login_window_secs: u64,
}

fn default_login_max_attempts() -> u32 {
    5
}

fn default_login_window() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            login_max_attempts: default_login_max_attempts(),
            login_window_secs: default_login_window(),
        }
    }
}

/// Initial administrator account, created at startup if missing.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Administrator email (login name).
    #[serde(default)]
    pub email: Option<String>,
    /// Administrator password.
    #[serde(default)]
    pub password: Option<String>,
    /// Administrator display name.
    #[serde(default = "default_admin_name")]
    pub name: String,
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            name: default_admin_name(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token and cookie configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Password hashing cost.
    #[serde(default)]
    pub password: PasswordConfig,
    /// Login rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Initial administrator.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TokengateError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| TokengateError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TOKENGATE_SECRET_KEY`: token signing secret
    /// - `TOKENGATE_DATABASE_URL`: database URL
    /// - `TOKENGATE_ADMIN_EMAIL` / `TOKENGATE_ADMIN_PASSWORD`: initial administrator
    /// - `TOKENGATE_SECURE_COOKIE`: `true` / `false`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_env("TOKENGATE_SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        if let Some(url) = non_empty_env("TOKENGATE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(email) = non_empty_env("TOKENGATE_ADMIN_EMAIL") {
            self.admin.email = Some(email);
        }
        if let Some(password) = non_empty_env("TOKENGATE_ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }
        if let Some(secure) = non_empty_env("TOKENGATE_SECURE_COOKIE") {
            match secure.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.auth.secure_cookie = true,
                "false" | "0" | "no" => self.auth.secure_cookie = false,
                other => tracing::warn!(value = %other, "Ignoring invalid TOKENGATE_SECURE_COOKIE"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the secret key is not set
    /// - the algorithm is not an HMAC algorithm
    /// - a token lifetime is zero or longer than ten years, or the refresh lifetime is not
    ///   longer than the access lifetime
    /// - the login rate limit allows zero attempts or has a zero window
    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.is_empty() {
            return Err(TokengateError::Validation(
                "secret_key is not set. \
                 Set it in config.toml or via TOKENGATE_SECRET_KEY environment variable."
                    .to_string(),
            ));
        }
        if !SUPPORTED_ALGORITHMS.contains(&self.auth.algorithm.as_str()) {
            return Err(TokengateError::Validation(format!(
                "unsupported algorithm {}, expected one of {}",
                self.auth.algorithm,
                SUPPORTED_ALGORITHMS.join(", ")
            )));
        }
        if self.auth.access_token_ttl_mins == 0 {
            return Err(TokengateError::Validation(
                "access_token_ttl_mins must be positive".to_string(),
            ));
        }
        if self.auth.refresh_token_ttl_mins > MAX_TOKEN_TTL_MINS {
            return Err(TokengateError::Validation(format!(
                "token lifetimes must be at most {MAX_TOKEN_TTL_MINS} minutes"
            )));
        }
        if self.auth.refresh_token_ttl_mins <= self.auth.access_token_ttl_mins {
            return Err(TokengateError::Validation(
                "refresh_token_ttl_mins must be longer than access_token_ttl_mins".to_string(),
            ));
        }
        if self.rate_limit.login_max_attempts == 0 || self.rate_limit.login_window_secs == 0 {
            return Err(TokengateError::Validation(
                "login rate limit must allow at least one attempt per non-empty window"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
