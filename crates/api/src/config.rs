use cda_core::lock::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_REVOKE_TIMEOUT_SECS};
use cda_core::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_PROFILE_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Catalog page size when `page-size` is absent (default: `100`).
    pub default_page_size: i64,
    /// Page size of the time-series profile catalogs when `page-size` is
    /// absent (default: `500`).
    pub profile_page_size: i64,
    /// Largest accepted catalog page size (default: `500`).
    pub max_page_size: i64,
    /// Interval between revocation status checks while a lock request waits
    /// (default: `250`).
    pub lock_poll_interval_ms: u64,
    /// Revoke window when `revoke-timeout` is absent (default: `10`).
    pub default_revoke_timeout_secs: u64,
    /// Largest accepted `revoke-timeout`; keep it below the request timeout
    /// (default: `20`).
    pub max_revoke_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `DEFAULT_PAGE_SIZE`           | `100`                      |
    /// | `PROFILE_PAGE_SIZE`           | `500`                      |
    /// | `MAX_PAGE_SIZE`               | `500`                      |
    /// | `LOCK_POLL_INTERVAL_MS`       | `250`                      |
    /// | `DEFAULT_REVOKE_TIMEOUT_SECS` | `10`                       |
    /// | `MAX_REVOKE_TIMEOUT_SECS`     | `20`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 3000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", 30);
        let default_page_size: i64 = env_or("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let profile_page_size: i64 = env_or("PROFILE_PAGE_SIZE", DEFAULT_PROFILE_PAGE_SIZE);
        let max_page_size: i64 = env_or("MAX_PAGE_SIZE", MAX_PAGE_SIZE);
        let lock_poll_interval_ms: u64 = env_or("LOCK_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS);
        let default_revoke_timeout_secs: u64 =
            env_or("DEFAULT_REVOKE_TIMEOUT_SECS", DEFAULT_REVOKE_TIMEOUT_SECS);
        let max_revoke_timeout_secs: u64 = env_or("MAX_REVOKE_TIMEOUT_SECS", 20);

        assert!(max_page_size >= 1, "MAX_PAGE_SIZE must be at least 1");
        assert!(
            default_revoke_timeout_secs <= max_revoke_timeout_secs,
            "DEFAULT_REVOKE_TIMEOUT_SECS must not exceed MAX_REVOKE_TIMEOUT_SECS"
        );

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            default_page_size,
            profile_page_size,
            max_page_size,
            lock_poll_interval_ms,
            default_revoke_timeout_secs,
            max_revoke_timeout_secs,
        }
    }
}

/// Parse `name` from the environment, falling back to `default` when unset.
///
/// # Panics
///
/// Panics if the variable is set but does not parse.
fn env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
